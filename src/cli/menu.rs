//! Interactive numbered menu

use super::commands::{run_command, CommandContext, EXIT_INTERRUPTED, EXIT_SUCCESS};
use super::registry::{by_category, CommandSpec};
use crate::core::shutdown::is_shutdown_requested;

/// What the operator picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    Run(&'static CommandSpec),
    Invalid,
}

/// Menu text and the commands behind each number, starting at 1
pub fn render_menu() -> (String, Vec<&'static CommandSpec>) {
    let mut text = String::from("\nSelect an action:\n");
    let mut entries = Vec::new();

    for (category, commands) in by_category() {
        text.push_str(&format!("\n== {} ==\n", category.title()));
        for command in commands {
            entries.push(command);
            text.push_str(&format!("{}. {}\n", entries.len(), command.label));
        }
    }
    text.push_str("\n0. Exit\n");
    (text, entries)
}

pub fn parse_choice(input: &str, entries: &[&'static CommandSpec]) -> MenuChoice {
    match input.trim().parse::<usize>() {
        Ok(0) => MenuChoice::Exit,
        Ok(n) => entries
            .get(n - 1)
            .copied()
            .map(MenuChoice::Run)
            .unwrap_or(MenuChoice::Invalid),
        Err(_) => MenuChoice::Invalid,
    }
}

/// Show the menu until the operator exits or interrupts
pub async fn run_menu(ctx: &mut CommandContext) -> anyhow::Result<i32> {
    let (text, entries) = render_menu();

    loop {
        if is_shutdown_requested(&ctx.shutdown) {
            return Ok(EXIT_INTERRUPTED);
        }

        print!("{text}");
        let input = match ctx.prompter.input("Enter your choice") {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(error = %e, "Menu input closed");
                println!("\nExiting.");
                return Ok(EXIT_SUCCESS);
            }
        };

        match parse_choice(&input, &entries) {
            MenuChoice::Exit => {
                println!("Exiting.");
                return Ok(EXIT_SUCCESS);
            }
            MenuChoice::Run(command) => {
                let code = run_command(command, &[], ctx).await?;
                if code == EXIT_INTERRUPTED {
                    return Ok(code);
                }
            }
            MenuChoice::Invalid => println!("Invalid choice."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::registry::COMMANDS;

    #[test]
    fn test_menu_lists_every_command() {
        let (text, entries) = render_menu();
        assert_eq!(entries.len(), COMMANDS.len());
        assert!(text.contains("== Setup =="));
        assert!(text.contains("== Simulation =="));
        assert!(text.contains("== Utilities =="));
        assert!(text.contains("1. Configure ngrok for local development"));
        assert!(text.contains("0. Exit"));
    }

    #[test]
    fn test_parse_choice() {
        let (_, entries) = render_menu();
        assert_eq!(parse_choice("0", &entries), MenuChoice::Exit);
        assert_eq!(parse_choice(" 1 ", &entries), MenuChoice::Run(entries[0]));
        assert_eq!(parse_choice("abc", &entries), MenuChoice::Invalid);
        assert_eq!(parse_choice("999", &entries), MenuChoice::Invalid);
        assert_eq!(parse_choice("-1", &entries), MenuChoice::Invalid);
    }
}
