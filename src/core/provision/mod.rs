//! Provisioning of the demo's collections and stream processing resources
//!
//! - [`catalog`]: the fixed set of resources the demo needs
//! - [`classify`]: mapping of Atlas errors to already-exists and already-started outcomes
//! - [`reconciler`]: ordered, idempotent application of resource specs

pub mod catalog;
pub mod classify;
pub mod reconciler;

pub use catalog::KafkaSource;
pub use classify::RemoteOutcome;
pub use reconciler::{ProvisioningReport, Reconciler, ReportEntry};
