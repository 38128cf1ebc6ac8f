//! ngrok agent configuration file

use crate::config::{SecretString, TunnelSettings};
use crate::domain::Result;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const NGROK_CONFIG_VERSION: &str = "2";

/// One tunnel definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelDefinition {
    pub proto: String,
    pub addr: u16,
}

/// Contents of the ngrok config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgrokConfig {
    pub version: String,
    pub authtoken: String,
    pub tunnels: BTreeMap<String, TunnelDefinition>,
}

impl NgrokConfig {
    /// HTTP tunnel for the order service and TCP tunnel for Kafka
    pub fn for_demo(settings: &TunnelSettings, authtoken: &SecretString) -> Self {
        let mut tunnels = BTreeMap::new();
        tunnels.insert(
            settings.order_tunnel_name.clone(),
            TunnelDefinition {
                proto: "http".to_string(),
                addr: settings.order_port,
            },
        );
        tunnels.insert(
            settings.kafka_tunnel_name.clone(),
            TunnelDefinition {
                proto: "tcp".to_string(),
                addr: settings.kafka_port,
            },
        );

        Self {
            version: NGROK_CONFIG_VERSION.to_string(),
            authtoken: authtoken.expose_secret().as_str().to_string(),
            tunnels,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml()?)?;
        tracing::info!(path = %path.display(), "Wrote ngrok config");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}
