//! Extraction of public tunnel URLs from the ngrok log
//!
//! ngrok logs one line per started tunnel, for example:
//!
//! ```text
//! t=... lvl=info msg="started tunnel" obj=tunnels name=order addr=http://localhost:5002 url=https://abcd.ngrok.app
//! t=... lvl=info msg="started tunnel" obj=tunnels name=shopping-cart-kafka addr=//localhost:9092 url=tcp://0.tcp.ngrok.io:12345
//! ```

use crate::config::TunnelSettings;
use crate::domain::{OrderflowError, Result};
use regex::Regex;

/// URLs found so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunnelUrls {
    pub order_service_url: Option<String>,
    /// `host:port`, without the `tcp://` scheme
    pub kafka_bootstrap_servers: Option<String>,
}

impl TunnelUrls {
    pub fn is_complete(&self) -> bool {
        self.order_service_url.is_some() && self.kafka_bootstrap_servers.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.order_service_url.is_none() && self.kafka_bootstrap_servers.is_none()
    }
}

/// Matches the two tunnel lines for the configured names and ports
#[derive(Debug, Clone)]
pub struct LogScanner {
    order: Regex,
    kafka: Regex,
}

impl LogScanner {
    pub fn new(settings: &TunnelSettings) -> Result<Self> {
        let order = format!(
            r"name={} addr=http://localhost:{} url=(https://\S+)",
            regex::escape(&settings.order_tunnel_name),
            settings.order_port
        );
        let kafka = format!(
            r"name={} addr=//localhost:{} url=tcp://(\S+)",
            regex::escape(&settings.kafka_tunnel_name),
            settings.kafka_port
        );

        Ok(Self {
            order: compile(&order)?,
            kafka: compile(&kafka)?,
        })
    }

    /// First match of each tunnel in the log contents
    pub fn scan(&self, log: &str) -> TunnelUrls {
        TunnelUrls {
            order_service_url: first_capture(&self.order, log),
            kafka_bootstrap_servers: first_capture(&self.kafka, log),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| OrderflowError::Configuration(format!("Invalid tunnel log pattern: {e}")))
}

fn first_capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
