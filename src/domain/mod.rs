//! Domain models and types for orderflow.
//!
//! The domain layer provides:
//! - **Resources** ([`ResourceSpec`], [`ProvisioningResult`]) describing what gets provisioned
//!   in Atlas and how each step ended
//! - **Clusters** ([`ClusterDescriptor`]) as reported by the Atlas control plane
//! - **Error types** ([`OrderflowError`], [`AtlasApiError`], [`MongoError`], [`TunnelError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use orderflow::domain::{CollectionSpec, ResourceKind, ResourceSpec};
//!
//! let spec = ResourceSpec::Collection(
//!     CollectionSpec::new("shoppingcartdb", "incoming_shopping_cart_events").capped(1_000_000),
//! );
//! assert_eq!(spec.kind(), ResourceKind::Collection);
//! assert_eq!(spec.name(), "shoppingcartdb.incoming_shopping_cart_events");
//! ```

pub mod cluster;
pub mod errors;
pub mod resource;
pub mod result;

pub use cluster::{derive_mongo_url, ClusterDescriptor, ClusterTier};
pub use errors::{AtlasApiError, MongoError, OrderflowError, TunnelError};
pub use resource::{
    CollectionSpec, ConnectionKind, ConnectionSpec, ProcessorSpec, ProvisioningResult,
    ResourceKind, ResourceSpec, StreamInstanceSpec,
};
pub use result::Result;
