//! Configuration management
//!
//! Two kinds of configuration live here:
//! - [`Settings`]: the driver's own tunables, read once at startup from an optional
//!   TOML file plus `ORDERFLOW_*` overrides ([`load_settings`])
//! - [`EnvStore`]: the demo's `KEY="VALUE"` env file, which the prompter and the tunnel
//!   manager fill in and every command reads from
//!
//! # Example
//!
//! ```no_run
//! use orderflow::config::{load_settings, EnvStore};
//!
//! # fn example() -> orderflow::domain::Result<()> {
//! let settings = load_settings("orderflow.toml")?;
//! let mut store = EnvStore::load_or_create(".env", "env")?;
//! store.set("ATLAS_CLUSTER_NAME", &settings.atlas.default_cluster_name)?;
//! # Ok(())
//! # }
//! ```

pub mod env_file;
pub mod loader;
pub mod schema;
pub mod secret;
pub mod variables;

pub use env_file::EnvStore;
pub use loader::{load_settings, load_settings_with};
pub use schema::{AtlasSettings, LoggingConfig, Settings, SimulationSettings, TunnelSettings};
pub use secret::{secret_from, SecretString, SecretValue};
pub use variables::Variable;
