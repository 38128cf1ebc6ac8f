// Orderflow - MongoDB Atlas order-fulfillment demo driver
// Copyright (c) 2025 Orderflow Contributors
// Licensed under the MIT License

use clap::Parser;
use orderflow::cli::commands::{
    run_command, CommandContext, EXIT_CONFIGURATION, EXIT_FAILURE,
};
use orderflow::cli::menu::run_menu;
use orderflow::cli::{registry, Cli};
use orderflow::config::{load_settings, EnvStore, Settings};
use orderflow::core::configure::DialoguerPrompter;
use orderflow::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    let settings = match load_settings(&cli.settings) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(EXIT_CONFIGURATION);
        }
    };

    let guard = match init_logging(cli.effective_log_level(), &settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FAILURE);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Orderflow - MongoDB Atlas order-fulfillment demo driver"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("Received SIGINT (Ctrl+C), shutting down");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, shutting down");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to create SIGTERM handler");
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                        return;
                    }
                    tracing::info!("Received SIGINT (Ctrl+C), shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Received SIGINT (Ctrl+C), shutting down");
        }

        println!("\n⚠️  Shutdown signal received, stopping...");
        let _ = shutdown_tx.send(true);
    });

    // Execute command and get exit code
    let exit_code = match execute_command(&cli, settings, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FAILURE
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command, or show the menu when none is given
async fn execute_command(
    cli: &Cli,
    settings: Settings,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    let command = match cli.command.as_deref() {
        Some(name) => match registry::find(name) {
            Some(spec) => Some(spec),
            None => {
                println!("Unknown command: {name}");
                println!("Available commands:");
                for spec in registry::COMMANDS {
                    println!("  {}", spec.name);
                }
                return Ok(EXIT_CONFIGURATION);
            }
        },
        None => None,
    };

    let store = match EnvStore::load_or_create(&cli.env_file, &cli.env_template) {
        Ok(store) => store,
        Err(e) => {
            println!("❌ {e}");
            return Ok(EXIT_CONFIGURATION);
        }
    };

    let mut ctx = CommandContext::new(
        settings,
        store,
        shutdown_signal,
        cli.debug_enabled(),
        Box::new(DialoguerPrompter),
    );

    match command {
        Some(spec) => run_command(spec, &cli.command_args(), &mut ctx).await,
        None => run_menu(&mut ctx).await,
    }
}
