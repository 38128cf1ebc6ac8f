//! ngrok commands

use super::{CommandContext, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::secret_from;
use crate::config::variables::{lookup, NGROK_AUTHTOKEN};
use crate::core::configure::Configurator;
use crate::core::tunnel::{write_urls, NgrokConfig, TunnelManager, TunnelState};
use crate::domain::{OrderflowError, Result};
use std::process::ExitStatus;

/// Ask for the auth token (unless stored) and write the ngrok config file
pub async fn setup_ngrok(ctx: &mut CommandContext) -> Result<i32> {
    let variable = lookup(NGROK_AUTHTOKEN).ok_or_else(|| {
        OrderflowError::Configuration(format!("{NGROK_AUTHTOKEN} is not catalogued"))
    })?;

    if !ctx.store.is_set(NGROK_AUTHTOKEN) {
        println!("\nngrok authentication token needed for setup.");
        println!(
            "You can get your auth token from https://dashboard.ngrok.com/get-started/your-authtoken"
        );
    }
    let configurator = Configurator::new(
        ctx.prompter.as_ref(),
        ctx.settings.atlas.default_cluster_name.clone(),
    );
    configurator.ensure_variable(&mut ctx.store, variable)?;
    let token = secret_from(ctx.store.require(NGROK_AUTHTOKEN)?);

    let path = &ctx.settings.tunnel.config_path;
    println!("\n📝 Creating local ngrok configuration file...");
    NgrokConfig::for_demo(&ctx.settings.tunnel, &token).write(path)?;

    println!("✅ Created {path} with tunnels for the order service and Kafka.");
    println!("\nStart ngrok with:");
    println!("   orderflow start-ngrok");
    Ok(EXIT_SUCCESS)
}

/// Launch ngrok, record the public URLs and keep it running until interrupted
pub async fn start_ngrok(ctx: &mut CommandContext) -> Result<i32> {
    let mut manager = TunnelManager::new(&ctx.settings.tunnel, ctx.debug)?;
    let mut tunnel = manager.launch()?;

    let urls = manager.observe(&mut tunnel, &ctx.shutdown).await?;
    if let Some(url) = &urls.order_service_url {
        println!("✅ Found Order Service URL: {url}");
    }
    if let Some(servers) = &urls.kafka_bootstrap_servers {
        println!("✅ Found Kafka Bootstrap Server: {servers}");
    }
    if let TunnelState::TimedOut(_) = manager.state() {
        println!(
            "⚠️  Not every tunnel URL showed up within {}s; run with --debug to see the ngrok log.",
            ctx.settings.tunnel.observation_window_seconds
        );
    }

    if !urls.is_empty() {
        write_urls(&mut ctx.store, &urls)?;
        println!("\n📝 Updated {} with ngrok URLs.", ctx.store.path().display());
    }

    println!("\nngrok is now running. Press Ctrl+C in this terminal to stop it.");
    let status = manager.supervise(tunnel, &ctx.shutdown).await?;
    if !status.success() {
        println!("❌ ngrok exited with {status}");
    }
    Ok(process_exit_code(status))
}

/// ngrok's own exit code; killed by a signal counts as a failure
fn process_exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => EXIT_FAILURE,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_ngrok_exit_code_is_propagated() {
        assert_eq!(process_exit_code(ExitStatus::from_raw(0)), EXIT_SUCCESS);
        assert_eq!(process_exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // SIGKILL
        assert_eq!(process_exit_code(ExitStatus::from_raw(9)), EXIT_FAILURE);
    }
}
