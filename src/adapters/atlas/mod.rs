//! Atlas control plane integration
//!
//! [`ControlPlane`] is the seam between the provisioning logic and the Atlas Admin API.
//! [`AtlasClient`] implements it over HTTPS with digest authentication; tests substitute
//! in-memory fakes.
//!
//! Cluster operations return [`crate::domain::Result`]. Stream processing operations
//! return the raw [`AtlasApiError`] so that the reconciler can classify "already exists"
//! responses per call site.

pub mod client;
pub(crate) mod models;

pub use client::{poll_until_ready, ApiResponse, AtlasClient, AtlasCredentials};

use crate::domain::{
    AtlasApiError, ClusterDescriptor, ConnectionSpec, ProcessorSpec, Result, StreamInstanceSpec,
};
use async_trait::async_trait;

/// Result of a stream processing call
pub type ApiResult<T> = std::result::Result<T, AtlasApiError>;

/// Operations the driver needs from the Atlas control plane
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Create a cluster and wait until it is ready
    async fn create_cluster(&self, name: &str) -> Result<()>;

    /// Provider, region and connection string of a cluster (flex or standard)
    async fn cluster_connection_info(&self, name: &str) -> Result<ClusterDescriptor>;

    /// All flex and standard clusters in the project
    async fn list_clusters(&self) -> Result<Vec<ClusterDescriptor>>;

    async fn create_stream_instance(&self, spec: &StreamInstanceSpec) -> ApiResult<()>;

    async fn create_connection(&self, instance: &str, spec: &ConnectionSpec) -> ApiResult<()>;

    async fn create_processor(&self, instance: &str, spec: &ProcessorSpec) -> ApiResult<()>;

    async fn start_processor(&self, instance: &str, name: &str) -> ApiResult<()>;
}
