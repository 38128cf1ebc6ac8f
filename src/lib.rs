// Orderflow - MongoDB Atlas order-fulfillment demo driver
// Copyright (c) 2025 Orderflow Contributors
// Licensed under the MIT License

//! # Orderflow - MongoDB Atlas order-fulfillment demo driver
//!
//! Orderflow provisions and drives an order-fulfillment demo built on MongoDB Atlas
//! Stream Processing. Shopping-cart events flow through a chain of stream processors
//! that turn carts into orders, validate them against an order service over HTTPS and
//! record every step in an order history collection.
//!
//! ## Overview
//!
//! This library provides:
//! - **Provisioning** of databases, collections, the stream processing instance, its
//!   connections and processors, all safe to repeat
//! - **Configuration** of the demo's env file, including cluster creation or selection
//!   and region mapping
//! - **Tunnelling** of the local order service and Kafka broker through ngrok
//! - **Simulation** of shopping-cart traffic into the capped events collection
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface, command registry and numbered menu
//! - [`core`] - Provisioning, configuration, tunnel and simulation logic
//! - [`adapters`] - Atlas Admin API, MongoDB and order service clients
//! - [`domain`] - Resource specs, cluster descriptors and errors
//! - [`config`] - Env file store, variable catalogue and driver settings
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orderflow::adapters::atlas::AtlasClient;
//! use orderflow::config::{load_settings, EnvStore};
//! use orderflow::core::provision::{catalog, Reconciler};
//! use orderflow::domain::ResourceSpec;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = load_settings("orderflow.toml")?;
//!     let store = EnvStore::load(".env")?;
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!
//!     let client = AtlasClient::from_store(&settings.atlas, &store, shutdown)?;
//!     let specs: Vec<ResourceSpec> = catalog::processors()
//!         .into_iter()
//!         .map(ResourceSpec::Processor)
//!         .collect();
//!
//!     let report = Reconciler::new()
//!         .with_control_plane(&client, "OrderFulfillmentInstance")
//!         .apply_all(&specs)
//!         .await?;
//!     println!("successful: {}", report.is_successful());
//!     Ok(())
//! }
//! ```
//!
//! ## Idempotency
//!
//! Atlas answers `409` for resources that already exist. Each call site classifies
//! those answers (see [`core::provision::classify`]) so that a second run reports
//! "already exists" instead of failing. Any other error stops the run.
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], built on [`domain::OrderflowError`]:
//!
//! ```rust,no_run
//! use orderflow::config::EnvStore;
//! use orderflow::domain::OrderflowError;
//!
//! fn example() -> Result<(), OrderflowError> {
//!     let store = EnvStore::load(".env")?;
//!     let project = store.require("ATLAS_PROJECT_ID")?;
//!     println!("{project}");
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Structured logging goes through `tracing`; see [`logging`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
