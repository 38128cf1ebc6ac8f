//! Domain error types
//!
//! This module defines the error hierarchy for orderflow. Errors from the HTTP client,
//! the MongoDB driver and the YAML/TOML parsers are converted into these types at the
//! adapter boundary, so callers never match on third-party error types.

use std::time::Duration;
use thiserror::Error;

/// Main orderflow error type
///
/// Every fallible operation in the crate returns this type (see [`crate::domain::Result`]).
#[derive(Debug, Error)]
pub enum OrderflowError {
    /// Configuration-related errors (settings file, env file, missing variables)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Atlas Admin API errors
    #[error("Atlas API error: {0}")]
    Atlas(#[from] AtlasApiError),

    /// MongoDB errors
    #[error("MongoDB error: {0}")]
    Mongo(#[from] MongoError),

    /// Tunnel (ngrok) errors
    #[error("Tunnel error: {0}")]
    Tunnel(#[from] TunnelError),

    /// Invalid input or an invalid request shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operator interrupted the run
    #[error("Interrupted by operator")]
    Interrupted,

    /// Interactive prompt failures (closed terminal, no tty)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl OrderflowError {
    /// Whether the error was caused by an operator interrupt
    pub fn is_interrupted(&self) -> bool {
        matches!(self, OrderflowError::Interrupted)
    }

    /// Whether the error is an authorization failure against the Atlas API
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            OrderflowError::Atlas(AtlasApiError::Unauthorized { .. })
        )
    }
}

/// Atlas Admin API errors
///
/// Non-2xx responses keep the raw response body so that it can be shown to the
/// operator verbatim.
#[derive(Debug, Error)]
pub enum AtlasApiError {
    /// Transport failure (DNS, TLS, connection reset)
    #[error("Failed to reach Atlas API: {0}")]
    Transport(String),

    /// 401/403 after digest authentication
    #[error("Atlas API rejected the credentials ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// Any other non-2xx response
    #[error("Atlas API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request did not complete within the client timeout
    #[error("Atlas API request timed out: {0}")]
    RequestTimeout(String),

    /// The digest challenge could not be parsed or answered
    #[error("Digest authentication failed: {0}")]
    DigestAuth(String),

    /// A 2xx response whose body was not the expected JSON shape
    #[error("Invalid response from Atlas API: {0}")]
    InvalidResponse(String),

    /// Cluster provisioning did not reach the ready state in time
    #[error("Cluster '{cluster}' was not ready after {waited:?}")]
    ClusterNotReady { cluster: String, waited: Duration },
}

impl AtlasApiError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AtlasApiError::Unauthorized { status, .. } | AtlasApiError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Raw response body of the failed response
    pub fn body(&self) -> Option<&str> {
        match self {
            AtlasApiError::Unauthorized { body, .. } | AtlasApiError::Status { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }
}

/// MongoDB errors
#[derive(Debug, Error)]
pub enum MongoError {
    /// Could not build a client or reach the cluster
    #[error("Failed to connect to MongoDB: {0}")]
    ConnectionFailed(String),

    /// Listing collections failed
    #[error("Failed to list collections in '{database}': {message}")]
    ListFailed { database: String, message: String },

    /// Collection creation failed
    #[error("Failed to create collection '{namespace}': {message}")]
    CreateFailed { namespace: String, message: String },

    /// collMod failed
    #[error("Failed to modify collection '{namespace}': {message}")]
    ModifyFailed { namespace: String, message: String },

    /// Insert failed
    #[error("Failed to insert document into '{namespace}': {message}")]
    InsertFailed { namespace: String, message: String },
}

/// Tunnel errors
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The ngrok binary could not be found on PATH
    #[error("'{0}' is not installed or not on PATH")]
    BinaryNotFound(String),

    /// The ngrok process could not be spawned
    #[error("Failed to start tunnel process: {0}")]
    SpawnFailed(String),

    /// The tunnel configuration file is missing
    #[error("Tunnel configuration not found at {0}; run setup-ngrok first")]
    ConfigMissing(String),

    /// Signalling or waiting on the process failed
    #[error("Failed to supervise tunnel process: {0}")]
    Supervision(String),
}

impl From<std::io::Error> for OrderflowError {
    fn from(err: std::io::Error) -> Self {
        OrderflowError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OrderflowError {
    fn from(err: serde_json::Error) -> Self {
        OrderflowError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for OrderflowError {
    fn from(err: serde_yaml::Error) -> Self {
        OrderflowError::Serialization(format!("YAML error: {err}"))
    }
}

impl From<toml::de::Error> for OrderflowError {
    fn from(err: toml::de::Error) -> Self {
        OrderflowError::Configuration(format!("TOML parse error: {err}"))
    }
}

/// Ctrl+C at a prompt surfaces as an interrupted read
impl From<dialoguer::Error> for OrderflowError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                OrderflowError::Interrupted
            }
            other => OrderflowError::Prompt(other.to_string()),
        }
    }
}
