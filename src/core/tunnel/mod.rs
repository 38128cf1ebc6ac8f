//! ngrok tunnel lifecycle
//!
//! The manager moves through
//! `NotStarted -> Launching -> ObservingLog -> Resolved | TimedOut`:
//!
//! - [`TunnelManager::launch`] starts `ngrok start --all` with a temporary log file
//! - [`TunnelManager::observe`] polls the log until both public URLs appear or the
//!   observation window closes; the process keeps running either way
//! - [`TunnelManager::supervise`] waits for the process until it exits or shutdown is
//!   requested
//!
//! On shutdown the process gets SIGTERM, a grace period, then a kill. The temporary log
//! file is removed when the [`RunningTunnel`] is dropped.

pub mod config;
pub mod log_scan;

pub use config::{NgrokConfig, TunnelDefinition};
pub use log_scan::{LogScanner, TunnelUrls};

use crate::config::variables::{KAFKA_BOOTSTRAP_SERVERS, ORDER_SERVICE_URL};
use crate::config::{EnvStore, TunnelSettings};
use crate::core::shutdown::wait_for_shutdown;
use crate::domain::{OrderflowError, Result, TunnelError};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::time::Instant;

/// Where the tunnel lifecycle currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelState {
    NotStarted,
    Launching,
    ObservingLog,
    /// Both URLs were found
    Resolved(TunnelUrls),
    /// The window closed; holds whatever was found
    TimedOut(TunnelUrls),
}

/// A launched ngrok process and its log file
#[derive(Debug)]
pub struct RunningTunnel {
    child: Child,
    log: NamedTempFile,
}

impl RunningTunnel {
    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Exit status if the process already ended
    pub fn try_status(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    async fn read_log(&self) -> String {
        tokio::fs::read_to_string(self.log.path())
            .await
            .unwrap_or_default()
    }
}

pub struct TunnelManager {
    settings: TunnelSettings,
    scanner: LogScanner,
    state: TunnelState,
    debug: bool,
}

impl TunnelManager {
    pub fn new(settings: &TunnelSettings, debug: bool) -> Result<Self> {
        Ok(Self {
            settings: settings.clone(),
            scanner: LogScanner::new(settings)?,
            state: TunnelState::NotStarted,
            debug,
        })
    }

    pub fn state(&self) -> &TunnelState {
        &self.state
    }

    /// Start ngrok with every tunnel in the config file
    pub fn launch(&mut self) -> Result<RunningTunnel> {
        let config_path = Path::new(&self.settings.config_path);
        if !config_path.exists() {
            return Err(TunnelError::ConfigMissing(config_path.display().to_string()).into());
        }

        self.state = TunnelState::Launching;
        let log = NamedTempFile::new()?;

        let child = Command::new(&self.settings.binary)
            .arg("start")
            .arg("--config")
            .arg(config_path)
            .arg("--all")
            .arg("--log")
            .arg(log.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    TunnelError::BinaryNotFound(self.settings.binary.clone())
                }
                _ => TunnelError::SpawnFailed(e.to_string()),
            })?;

        tracing::info!(
            binary = %self.settings.binary,
            pid = ?child.id(),
            log = %log.path().display(),
            "Launched tunnel process"
        );
        if self.debug {
            println!("📝 Monitoring ngrok log file: {}", log.path().display());
        }

        Ok(RunningTunnel { child, log })
    }

    /// Poll the log until both URLs are known or the observation window closes
    ///
    /// The process is left running on timeout. On shutdown it is terminated and
    /// [`OrderflowError::Interrupted`] is returned.
    pub async fn observe(
        &mut self,
        tunnel: &mut RunningTunnel,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<TunnelUrls> {
        self.state = TunnelState::ObservingLog;
        let mut shutdown = shutdown.clone();
        let deadline = Instant::now() + self.settings.observation_window();

        loop {
            let contents = tunnel.read_log().await;
            let urls = self.scanner.scan(&contents);

            if urls.is_complete() {
                self.print_log(&contents);
                self.state = TunnelState::Resolved(urls.clone());
                return Ok(urls);
            }

            if let Some(status) = tunnel.try_status()? {
                self.print_log(&contents);
                return Err(TunnelError::Supervision(format!(
                    "tunnel process exited early with {status}"
                ))
                .into());
            }

            if Instant::now() >= deadline {
                self.print_log(&contents);
                tracing::warn!(
                    window_secs = self.settings.observation_window().as_secs(),
                    order_found = urls.order_service_url.is_some(),
                    kafka_found = urls.kafka_bootstrap_servers.is_some(),
                    "Tunnel URLs not fully resolved, leaving the process running"
                );
                self.state = TunnelState::TimedOut(urls.clone());
                return Ok(urls);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.log_poll_interval()) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    self.terminate(tunnel).await;
                    return Err(OrderflowError::Interrupted);
                }
            }
        }
    }

    /// Wait for the process to exit, terminating it on shutdown
    pub async fn supervise(
        &self,
        mut tunnel: RunningTunnel,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<ExitStatus> {
        let mut shutdown = shutdown.clone();
        tokio::select! {
            status = tunnel.child.wait() => {
                let status = status.map_err(|e| TunnelError::Supervision(e.to_string()))?;
                tracing::info!(status = %status, "Tunnel process exited");
                Ok(status)
            }
            _ = wait_for_shutdown(&mut shutdown) => {
                self.terminate(&mut tunnel).await;
                Err(OrderflowError::Interrupted)
            }
        }
    }

    /// SIGTERM, then kill once the grace period is over
    pub async fn terminate(&self, tunnel: &mut RunningTunnel) {
        if let Err(e) = request_stop(&mut tunnel.child) {
            tracing::warn!(error = %e, "Failed to signal tunnel process");
        }

        let grace = self.settings.shutdown_grace();
        match tokio::time::timeout(grace, tunnel.child.wait()).await {
            Ok(Ok(status)) => tracing::info!(status = %status, "Tunnel process stopped"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to wait for tunnel process"),
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Tunnel process ignored SIGTERM, killing"
                );
                if let Err(e) = tunnel.child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill tunnel process");
                }
            }
        }
    }

    fn print_log(&self, contents: &str) {
        if self.debug {
            println!("\n[ngrok log file contents]:\n{contents}");
        }
    }
}

/// Store the URLs that were found
pub fn write_urls(store: &mut EnvStore, urls: &TunnelUrls) -> Result<()> {
    if let Some(url) = &urls.order_service_url {
        store.set(ORDER_SERVICE_URL, url)?;
    }
    if let Some(servers) = &urls.kafka_bootstrap_servers {
        store.set(KAFKA_BOOTSTRAP_SERVERS, servers)?;
    }
    Ok(())
}

#[cfg(unix)]
fn request_stop(child: &mut Child) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match child.id() {
        Some(pid) => kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(std::io::Error::from),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_without_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = TunnelSettings {
            config_path: dir.path().join("missing.yml").display().to_string(),
            ..TunnelSettings::default()
        };
        let mut manager = TunnelManager::new(&settings, false).unwrap();
        let err = manager.launch().unwrap_err();
        assert!(matches!(
            err,
            OrderflowError::Tunnel(TunnelError::ConfigMissing(_))
        ));
        assert_eq!(manager.state(), &TunnelState::NotStarted);
    }

    #[tokio::test]
    async fn test_launch_with_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join(".ngrok.yml");
        std::fs::write(&config, "version: '2'\n").unwrap();
        let settings = TunnelSettings {
            binary: "orderflow-no-such-ngrok-binary".to_string(),
            config_path: config.display().to_string(),
            ..TunnelSettings::default()
        };
        let mut manager = TunnelManager::new(&settings, false).unwrap();
        let err = manager.launch().unwrap_err();
        assert!(matches!(
            err,
            OrderflowError::Tunnel(TunnelError::BinaryNotFound(_))
        ));
    }

    #[test]
    fn test_write_urls_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "ORDER_SERVICE_URL=\"\"\nKAFKA_BOOTSTRAP_SERVERS=\"old:1\"\n").unwrap();
        let mut store = EnvStore::load(&path).unwrap();

        let urls = TunnelUrls {
            order_service_url: Some("https://x.ngrok.app".to_string()),
            kafka_bootstrap_servers: None,
        };
        write_urls(&mut store, &urls).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "ORDER_SERVICE_URL=\"https://x.ngrok.app\"\nKAFKA_BOOTSTRAP_SERVERS=\"old:1\"\n"
        );
    }
}
