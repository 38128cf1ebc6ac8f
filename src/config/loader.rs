//! Settings loader with TOML parsing and environment variable overrides
//!
//! Settings are read once at startup. The process environment is only consulted here,
//! never from inside command handlers.

use super::schema::Settings;
use crate::domain::errors::OrderflowError;
use crate::domain::result::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Loads settings from an optional TOML file
///
/// This function:
/// 1. Reads and parses the TOML file when it exists (defaults otherwise)
/// 2. Applies `ORDERFLOW_*` environment variable overrides
/// 3. Validates the result
///
/// # Examples
///
/// ```no_run
/// use orderflow::config::load_settings;
///
/// let settings = load_settings("orderflow.toml").expect("Failed to load settings");
/// ```
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let overrides: HashMap<String, String> = std::env::vars()
        .filter(|(key, _)| key.starts_with("ORDERFLOW_"))
        .collect();
    load_settings_with(path, &overrides)
}

/// Same as [`load_settings`] with an explicit override map
pub fn load_settings_with(
    path: impl AsRef<Path>,
    overrides: &HashMap<String, String>,
) -> Result<Settings> {
    let path = path.as_ref();

    let mut settings = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|e| {
            OrderflowError::Configuration(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|e| {
            OrderflowError::Configuration(format!(
                "Failed to parse settings file {}: {e}",
                path.display()
            ))
        })?
    } else {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        Settings::default()
    };

    apply_overrides(&mut settings, overrides)?;

    settings.validate().map_err(|e| {
        OrderflowError::Configuration(format!("Settings validation failed: {e}"))
    })?;

    Ok(settings)
}

/// Applies overrides using the `ORDERFLOW_<SECTION>_<KEY>` pattern
fn apply_overrides(settings: &mut Settings, overrides: &HashMap<String, String>) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "ORDERFLOW_ATLAS_BASE_URL" => settings.atlas.base_url = value.clone(),
            "ORDERFLOW_ATLAS_REQUEST_TIMEOUT_SECONDS" => {
                settings.atlas.request_timeout_seconds = parse_number(key, value)?
            }
            "ORDERFLOW_ATLAS_CLUSTER_POLL_INTERVAL_SECONDS" => {
                settings.atlas.cluster_poll_interval_seconds = parse_number(key, value)?
            }
            "ORDERFLOW_ATLAS_CLUSTER_READY_TIMEOUT_SECONDS" => {
                settings.atlas.cluster_ready_timeout_seconds = parse_number(key, value)?
            }
            "ORDERFLOW_ATLAS_DEFAULT_CLUSTER_NAME" => {
                settings.atlas.default_cluster_name = value.clone()
            }
            "ORDERFLOW_TUNNEL_BINARY" => settings.tunnel.binary = value.clone(),
            "ORDERFLOW_TUNNEL_CONFIG_PATH" => settings.tunnel.config_path = value.clone(),
            "ORDERFLOW_TUNNEL_OBSERVATION_WINDOW_SECONDS" => {
                settings.tunnel.observation_window_seconds = parse_number(key, value)?
            }
            "ORDERFLOW_SIMULATION_MAX_ROUNDS" => {
                settings.simulation.max_rounds = parse_number(key, value)?
            }
            "ORDERFLOW_LOGGING_LOCAL_ENABLED" => {
                settings.logging.local_enabled = value.parse().unwrap_or(false)
            }
            "ORDERFLOW_LOGGING_LOCAL_PATH" => settings.logging.local_path = value.clone(),
            other => tracing::debug!(key = %other, "Ignoring unknown settings override"),
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        OrderflowError::Configuration(format!("{key} must be a number, got '{value}'"))
    })
}
