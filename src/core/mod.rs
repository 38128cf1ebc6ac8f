//! Core logic of the demo driver
//!
//! # Modules
//!
//! - [`configure`] - Fills in the env file, resolving the cluster and its region
//! - [`provision`] - Idempotent creation of collections and stream processing resources
//! - [`region`] - Cluster region to stream processing region mapping
//! - [`shutdown`] - Helpers around the shutdown signal
//! - [`simulate`] - Synthetic shopping cart events
//! - [`tunnel`] - ngrok configuration, launch and supervision
//!
//! # Provisioning workflow
//!
//! 1. **Configure**: credentials, cluster, `MONGO_URL` and region
//! 2. **Collections**: databases and collections with pre/post images
//! 3. **Stream instance**: placed in the cluster's region
//! 4. **Connections**: cluster, order service and optional Kafka source
//! 5. **Processors**: the order pipeline, then started
//!
//! Every step treats an existing resource as success, so the whole sequence can be
//! re-run against a provisioned project.
//!
//! # Example
//!
//! ```rust,no_run
//! use orderflow::adapters::mongo::MongoAdmin;
//! use orderflow::config::EnvStore;
//! use orderflow::core::provision::{catalog, Reconciler};
//! use orderflow::domain::ResourceSpec;
//!
//! # async fn example() -> orderflow::domain::Result<()> {
//! let store = EnvStore::load(".env")?;
//! let mongo = MongoAdmin::from_store(&store).await?;
//!
//! let specs: Vec<ResourceSpec> = catalog::collections()
//!     .into_iter()
//!     .map(ResourceSpec::Collection)
//!     .collect();
//! let report = Reconciler::new().with_collections(&mongo).apply_all(&specs).await?;
//! assert!(report.is_successful());
//! # Ok(())
//! # }
//! ```

pub mod configure;
pub mod provision;
pub mod region;
pub mod shutdown;
pub mod simulate;
pub mod tunnel;
