//! External integrations
//!
//! - [`atlas`]: Atlas Admin API (clusters, stream processing) behind the
//!   [`atlas::ControlPlane`] trait
//! - [`mongo`]: MongoDB driver access behind [`mongo::CollectionAdmin`] and
//!   [`mongo::DocumentSink`]
//! - [`order_service`]: the order service's history endpoint

pub mod atlas;
pub mod mongo;
pub mod order_service;
