//! Operator prompts
//!
//! [`Prompter`] abstracts the terminal so the configuration flow can be driven by a
//! script in tests. [`DialoguerPrompter`] is the interactive implementation.

use crate::domain::{OrderflowError, Result};
use dialoguer::{Confirm, Input, Password, Select};

/// Questions the configuration flow asks the operator
pub trait Prompter: Send + Sync {
    /// Free text, echoed
    fn input(&self, prompt: &str) -> Result<String>;

    /// Free text, not echoed
    fn password(&self, prompt: &str) -> Result<String>;

    /// Index into `items`
    fn select(&self, prompt: &str, items: &[String]) -> Result<usize>;

    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Terminal prompts through `dialoguer`
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn password(&self, prompt: &str) -> Result<String> {
        let value = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(value)
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<usize> {
        if items.is_empty() {
            return Err(OrderflowError::Prompt(format!("nothing to select for '{prompt}'")));
        }
        let index = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?;
        Ok(index)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(answer)
    }
}
