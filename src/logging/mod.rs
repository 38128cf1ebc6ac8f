//! Logging and observability
//!
//! Structured logging through `tracing`, initialised by [`init_logging`]:
//! - console output on stderr, filtered by `RUST_LOG` or `--log-level`
//! - optional JSON files with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use orderflow::logging::init_logging;
//! use orderflow::config::LoggingConfig;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! tracing::info!(cluster = "Demo", "Cluster ready");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the outcome of a provisioning step
///
/// # Example
///
/// ```no_run
/// use orderflow::log_provisioning_outcome;
/// use orderflow::domain::{ProvisioningResult, ResourceKind};
///
/// let outcome = ProvisioningResult::Created;
/// log_provisioning_outcome!(ResourceKind::Connection, "mongoDBSink", &outcome);
/// ```
#[macro_export]
macro_rules! log_provisioning_outcome {
    ($kind:expr, $name:expr, $outcome:expr) => {
        match $outcome {
            $crate::domain::ProvisioningResult::Failed(reason) => tracing::error!(
                kind = %$kind,
                name = %$name,
                reason = %reason,
                "Provisioning step failed"
            ),
            other => tracing::info!(
                kind = %$kind,
                name = %$name,
                outcome = %other,
                "Provisioning step finished"
            ),
        }
    };
}

/// Log a remote call against the Atlas Admin API
///
/// # Example
///
/// ```no_run
/// use orderflow::log_atlas_call;
///
/// log_atlas_call!("POST", "/groups/abc/streams", 201u16);
/// ```
#[macro_export]
macro_rules! log_atlas_call {
    ($method:expr, $path:expr, $status:expr) => {
        tracing::debug!(
            method = %$method,
            path = %$path,
            status = $status,
            "Atlas API call"
        );
    };
}
