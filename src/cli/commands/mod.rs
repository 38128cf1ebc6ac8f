//! Command handlers
//!
//! [`run_command`] prepares the env file for a command and dispatches to its handler.
//! Handlers return a process exit code; errors are mapped to exit codes here.

pub mod history;
pub mod setup;
pub mod simulate;
pub mod tunnel;

use crate::adapters::atlas::{AtlasClient, ControlPlane};
use crate::cli::registry::{CommandSpec, Handler};
use crate::config::variables::KAFKA_BOOTSTRAP_SERVERS;
use crate::config::{EnvStore, Settings};
use crate::core::configure::{Configurator, Prompter};
use crate::domain::{OrderflowError, Result};
use tokio::sync::watch;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Everything a handler needs
pub struct CommandContext {
    pub settings: Settings,
    pub store: EnvStore,
    pub shutdown: watch::Receiver<bool>,
    pub debug: bool,
    pub prompter: Box<dyn Prompter>,
}

impl CommandContext {
    pub fn new(
        settings: Settings,
        store: EnvStore,
        shutdown: watch::Receiver<bool>,
        debug: bool,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        Self {
            settings,
            store,
            shutdown,
            debug,
            prompter,
        }
    }

    /// Atlas client for the credentials in the env file
    pub fn atlas_client(&self) -> Result<AtlasClient> {
        AtlasClient::from_store(&self.settings.atlas, &self.store, self.shutdown.clone())
    }

    /// Kafka credentials are needed when the command asks for them or a broker is set
    pub fn include_kafka(&self, spec: &CommandSpec) -> bool {
        spec.needs_kafka || self.store.is_set(KAFKA_BOOTSTRAP_SERVERS)
    }

    /// Fill in the env file for a command
    pub async fn prepare(&mut self, spec: &CommandSpec) -> Result<()> {
        if spec.skips_environment {
            return Ok(());
        }

        let include_kafka = self.include_kafka(spec);
        let settings = self.settings.atlas.clone();
        let shutdown = self.shutdown.clone();
        let configurator = Configurator::new(
            self.prompter.as_ref(),
            settings.default_cluster_name.clone(),
        );
        configurator
            .configure(&mut self.store, include_kafka, move |store| {
                let client = AtlasClient::from_store(&settings, store, shutdown)?;
                Ok(Box::new(client) as Box<dyn ControlPlane>)
            })
            .await
    }
}

/// Exit code for an error that ended a command
pub fn exit_code(err: &OrderflowError) -> i32 {
    match err {
        OrderflowError::Interrupted => EXIT_INTERRUPTED,
        OrderflowError::Configuration(_) => EXIT_CONFIGURATION,
        _ => EXIT_FAILURE,
    }
}

/// Print an error the way commands report failures and return its exit code
pub fn report_error(command: &str, err: &OrderflowError) -> i32 {
    if err.is_interrupted() {
        println!("\n⚠️  {command} interrupted");
    } else {
        println!("\n❌ Error executing command '{command}'");
        println!("   {err}");
    }
    tracing::error!(command = %command, error = %err, "Command failed");
    exit_code(err)
}

/// Prepare the environment and run one command
pub async fn run_command(
    spec: &CommandSpec,
    args: &[String],
    ctx: &mut CommandContext,
) -> anyhow::Result<i32> {
    tracing::info!(command = %spec.name, args = ?args, "Running command");

    if let Err(e) = ctx.prepare(spec).await {
        return Ok(report_error(spec.name, &e));
    }

    let outcome = match spec.handler {
        Handler::SetupNgrok => tunnel::setup_ngrok(ctx).await,
        Handler::StartNgrok => tunnel::start_ngrok(ctx).await,
        Handler::SetupDatabase => setup::setup_database(ctx).await,
        Handler::CreateStreamInstance => setup::create_stream_instance(ctx).await,
        Handler::SetupConnections => setup::setup_connections(ctx).await,
        Handler::SetupProcessors => setup::setup_processors(ctx).await,
        Handler::SetupAll => setup::setup_all(ctx).await,
        Handler::StartProcessors { include_kafka } => {
            setup::start_processors(ctx, include_kafka).await
        }
        Handler::SimulateShopping => simulate::simulate_shopping(ctx).await,
        Handler::GetOrderHistory => history::get_order_history(ctx, args).await,
        Handler::ListClusters => setup::list_clusters(ctx).await,
    };

    Ok(outcome.unwrap_or_else(|e| report_error(spec.name, &e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AtlasApiError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&OrderflowError::Interrupted), 130);
        assert_eq!(
            exit_code(&OrderflowError::Configuration("x".to_string())),
            2
        );
        let err: OrderflowError = AtlasApiError::Status {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_ctrl_c_at_prompt_exits_130() {
        let read_err = std::io::Error::new(std::io::ErrorKind::Interrupted, "read interrupted");
        let err = OrderflowError::from(dialoguer::Error::IO(read_err));
        assert_eq!(exit_code(&err), EXIT_INTERRUPTED);
    }
}
