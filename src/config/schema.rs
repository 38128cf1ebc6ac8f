//! Driver settings schema
//!
//! These are the tool's own tunables, separate from the demo's env file: API endpoint
//! and versions, polling cadence, tunnel ports and windows, simulation pacing and
//! logging. Every field has a default so that no settings file is required.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub atlas: AtlasSettings,

    #[serde(default)]
    pub tunnel: TunnelSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Validate the complete settings
    pub fn validate(&self) -> Result<(), String> {
        self.atlas.validate()?;
        self.tunnel.validate()?;
        self.simulation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Atlas Admin API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Version date for cluster endpoints
    #[serde(default = "default_clusters_api_version")]
    pub clusters_api_version: String,

    /// Version date for stream processing endpoints
    #[serde(default = "default_streams_api_version")]
    pub streams_api_version: String,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_cluster_poll_interval_seconds")]
    pub cluster_poll_interval_seconds: u64,

    #[serde(default = "default_cluster_ready_timeout_seconds")]
    pub cluster_ready_timeout_seconds: u64,

    /// Name used when the prompter creates a new cluster
    #[serde(default = "default_cluster_name")]
    pub default_cluster_name: String,

    #[serde(default = "default_stream_tier")]
    pub stream_tier: String,
}

impl AtlasSettings {
    fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("atlas.base_url must start with http:// or https://".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("atlas.request_timeout_seconds must be greater than 0".to_string());
        }
        if self.cluster_poll_interval_seconds == 0 {
            return Err("atlas.cluster_poll_interval_seconds must be greater than 0".to_string());
        }
        if self.cluster_ready_timeout_seconds < self.cluster_poll_interval_seconds {
            return Err(
                "atlas.cluster_ready_timeout_seconds must not be shorter than the poll interval"
                    .to_string(),
            );
        }
        if self.default_cluster_name.trim().is_empty() {
            return Err("atlas.default_cluster_name cannot be empty".to_string());
        }
        Ok(())
    }

    /// `Accept` header for cluster endpoints
    pub fn clusters_accept(&self) -> String {
        format!("application/vnd.atlas.{}+json", self.clusters_api_version)
    }

    /// `Accept` header for stream processing endpoints
    pub fn streams_accept(&self) -> String {
        format!("application/vnd.atlas.{}+json", self.streams_api_version)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn cluster_poll_interval(&self) -> Duration {
        Duration::from_secs(self.cluster_poll_interval_seconds)
    }

    pub fn cluster_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.cluster_ready_timeout_seconds)
    }
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            clusters_api_version: default_clusters_api_version(),
            streams_api_version: default_streams_api_version(),
            request_timeout_seconds: default_request_timeout_seconds(),
            cluster_poll_interval_seconds: default_cluster_poll_interval_seconds(),
            cluster_ready_timeout_seconds: default_cluster_ready_timeout_seconds(),
            default_cluster_name: default_cluster_name(),
            stream_tier: default_stream_tier(),
        }
    }
}

/// ngrok tunnel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelSettings {
    /// ngrok executable, looked up on PATH
    #[serde(default = "default_tunnel_binary")]
    pub binary: String,

    #[serde(default = "default_tunnel_config_path")]
    pub config_path: String,

    #[serde(default = "default_order_port")]
    pub order_port: u16,

    #[serde(default = "default_kafka_port")]
    pub kafka_port: u16,

    #[serde(default = "default_order_tunnel_name")]
    pub order_tunnel_name: String,

    #[serde(default = "default_kafka_tunnel_name")]
    pub kafka_tunnel_name: String,

    #[serde(default = "default_log_poll_interval_ms")]
    pub log_poll_interval_ms: u64,

    #[serde(default = "default_observation_window_seconds")]
    pub observation_window_seconds: u64,

    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
}

impl TunnelSettings {
    fn validate(&self) -> Result<(), String> {
        if self.binary.trim().is_empty() {
            return Err("tunnel.binary cannot be empty".to_string());
        }
        if self.order_port == 0 || self.kafka_port == 0 {
            return Err("tunnel ports must be greater than 0".to_string());
        }
        if self.log_poll_interval_ms == 0 {
            return Err("tunnel.log_poll_interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn log_poll_interval(&self) -> Duration {
        Duration::from_millis(self.log_poll_interval_ms)
    }

    pub fn observation_window(&self) -> Duration {
        Duration::from_secs(self.observation_window_seconds)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

impl Default for TunnelSettings {
    fn default() -> Self {
        Self {
            binary: default_tunnel_binary(),
            config_path: default_tunnel_config_path(),
            order_port: default_order_port(),
            kafka_port: default_kafka_port(),
            order_tunnel_name: default_order_tunnel_name(),
            kafka_tunnel_name: default_kafka_tunnel_name(),
            log_poll_interval_ms: default_log_poll_interval_ms(),
            observation_window_seconds: default_observation_window_seconds(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

/// Shopping simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_events_per_round")]
    pub events_per_round: usize,

    #[serde(default = "default_customers")]
    pub customers: u32,

    #[serde(default = "default_event_interval_ms")]
    pub event_interval_ms: u64,

    #[serde(default = "default_round_pause_ms")]
    pub round_pause_ms: u64,

    /// Stop after this many rounds; 0 runs until interrupted
    #[serde(default)]
    pub max_rounds: usize,

    #[serde(default = "default_events_collection")]
    pub events_collection: String,
}

impl SimulationSettings {
    fn validate(&self) -> Result<(), String> {
        if self.events_per_round == 0 {
            return Err("simulation.events_per_round must be greater than 0".to_string());
        }
        if self.customers == 0 {
            return Err("simulation.customers must be greater than 0".to_string());
        }
        if self.events_collection.trim().is_empty() {
            return Err("simulation.events_collection cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn event_interval(&self) -> Duration {
        Duration::from_millis(self.event_interval_ms)
    }

    pub fn round_pause(&self) -> Duration {
        Duration::from_millis(self.round_pause_ms)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            events_per_round: default_events_per_round(),
            customers: default_customers(),
            event_interval_ms: default_event_interval_ms(),
            round_pause_ms: default_round_pause_ms(),
            max_rounds: 0,
            events_collection: default_events_collection(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rotating files in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// `daily` or `hourly`
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "logging.local_rotation must be 'daily' or 'hourly', got '{}'",
                self.local_rotation
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

fn default_base_url() -> String {
    "https://cloud.mongodb.com/api/atlas/v2".to_string()
}

fn default_clusters_api_version() -> String {
    "2024-11-23".to_string()
}

fn default_streams_api_version() -> String {
    "2024-05-30".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_cluster_poll_interval_seconds() -> u64 {
    10
}

fn default_cluster_ready_timeout_seconds() -> u64 {
    300
}

fn default_cluster_name() -> String {
    "OrderFulfillmentDemoCluster".to_string()
}

fn default_stream_tier() -> String {
    "SP10".to_string()
}

fn default_tunnel_binary() -> String {
    "ngrok".to_string()
}

fn default_tunnel_config_path() -> String {
    ".ngrok.yml".to_string()
}

fn default_order_port() -> u16 {
    5002
}

fn default_kafka_port() -> u16 {
    9092
}

fn default_order_tunnel_name() -> String {
    "order".to_string()
}

fn default_kafka_tunnel_name() -> String {
    "shopping-cart-kafka".to_string()
}

fn default_log_poll_interval_ms() -> u64 {
    500
}

fn default_observation_window_seconds() -> u64 {
    20
}

fn default_shutdown_grace_seconds() -> u64 {
    5
}

fn default_events_per_round() -> usize {
    100
}

fn default_customers() -> u32 {
    25
}

fn default_event_interval_ms() -> u64 {
    500
}

fn default_round_pause_ms() -> u64 {
    2000
}

fn default_events_collection() -> String {
    "incoming_shopping_cart_events".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
