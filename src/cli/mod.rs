//! CLI interface and argument parsing
//!
//! `orderflow <command> [args...]` runs one command; without a command the numbered
//! menu is shown.

pub mod commands;
pub mod menu;
pub mod registry;

use clap::Parser;

const DEBUG_FLAG: &str = "--debug";

/// Orderflow - MongoDB Atlas order-fulfillment demo driver
#[derive(Parser, Debug)]
#[command(name = "orderflow")]
#[command(version, about, long_about = None)]
#[command(author = "Orderflow Contributors")]
pub struct Cli {
    /// Command to run; omit for the interactive menu
    pub command: Option<String>,

    /// Arguments passed to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Print debug information (ngrok log contents, debug logging)
    #[arg(long)]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ORDERFLOW_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Path to the env file holding the demo variables
    #[arg(long, default_value = ".env", env = "ORDERFLOW_ENV_FILE")]
    pub env_file: String,

    /// Template used to create the env file when it does not exist
    #[arg(long, default_value = "env")]
    pub env_template: String,

    /// Path to the driver settings file
    #[arg(short, long, default_value = "orderflow.toml", env = "ORDERFLOW_SETTINGS")]
    pub settings: String,
}

impl Cli {
    /// `--debug` given before or after the command name
    pub fn debug_enabled(&self) -> bool {
        self.debug || self.args.iter().any(|a| a == DEBUG_FLAG)
    }

    /// Command arguments with driver flags removed
    pub fn command_args(&self) -> Vec<String> {
        self.args
            .iter()
            .filter(|a| *a != DEBUG_FLAG)
            .cloned()
            .collect()
    }

    /// Explicit `--log-level`, else `debug` with `--debug`, else `warn`
    pub fn effective_log_level(&self) -> &str {
        match self.log_level.as_deref() {
            Some(level) => level,
            None if self.debug_enabled() => "debug",
            None => "warn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_menu() {
        let cli = Cli::parse_from(["orderflow"]);
        assert!(cli.command.is_none());
        assert!(cli.args.is_empty());
        assert_eq!(cli.env_file, ".env");
        assert_eq!(cli.env_template, "env");
        assert_eq!(cli.settings, "orderflow.toml");
    }

    #[test]
    fn test_cli_parse_command_with_args() {
        let cli = Cli::parse_from(["orderflow", "get-order-history", "abc-123"]);
        assert_eq!(cli.command.as_deref(), Some("get-order-history"));
        assert_eq!(cli.command_args(), vec!["abc-123".to_string()]);
    }

    #[test]
    fn test_cli_parse_debug_before_command() {
        let cli = Cli::parse_from(["orderflow", "--debug", "start-ngrok"]);
        assert!(cli.debug_enabled());
        assert_eq!(cli.command.as_deref(), Some("start-ngrok"));
    }

    #[test]
    fn test_cli_parse_debug_after_command() {
        let cli = Cli::parse_from(["orderflow", "start-ngrok", "--debug"]);
        assert!(cli.debug_enabled());
        assert!(cli.command_args().is_empty());
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["orderflow", "--log-level", "info", "setup-all"]);
        assert_eq!(cli.log_level, Some("info".to_string()));
        assert_eq!(cli.effective_log_level(), "info");
    }

    #[test]
    fn test_default_log_level_is_warn() {
        let cli = Cli::parse_from(["orderflow", "setup-all"]);
        assert_eq!(cli.effective_log_level(), "warn");
    }

    #[test]
    fn test_cli_parse_env_file() {
        let cli = Cli::parse_from(["orderflow", "--env-file", "demo.env", "setup-database"]);
        assert_eq!(cli.env_file, "demo.env");
    }
}
