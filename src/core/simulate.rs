//! Synthetic shopping-cart traffic
//!
//! Each round draws a fixed number of events over a pool of customers. A customer
//! without a cart opens one; otherwise the cart either gains an item or is turned into
//! an order. Carts still open at the end of a round are turned into orders. Events land
//! in the capped collection that feeds the cart processor.

use crate::adapters::mongo::DocumentSink;
use crate::config::SimulationSettings;
use crate::core::provision::catalog::SHOPPING_CART_DB;
use crate::core::shutdown::wait_for_shutdown;
use crate::domain::{OrderflowError, Result};
use bson::{doc, Document};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

pub const CREATE_SHOPPING_CART: &str = "create_shopping_cart";
pub const UPDATE_SHOPPING_CART: &str = "update_shopping_cart";
pub const CREATE_ORDER: &str = "create_order";

const ADD_ITEM_PROBABILITY: f64 = 0.7;
const MAX_ITEM_ID: u32 = 100;
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Cart state as carried in each event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: String,
    pub customer_id: u32,
    pub items: Vec<u32>,
    pub status: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Generates cart events for a pool of customers
pub struct CartSimulator<R: Rng> {
    rng: R,
    customers: u32,
    open: BTreeMap<u32, Cart>,
}

impl CartSimulator<StdRng> {
    pub fn from_entropy(customers: u32) -> Self {
        Self::new(StdRng::from_entropy(), customers)
    }
}

impl<R: Rng> CartSimulator<R> {
    pub fn new(rng: R, customers: u32) -> Self {
        Self {
            rng,
            customers: customers.max(1),
            open: BTreeMap::new(),
        }
    }

    pub fn open_carts(&self) -> usize {
        self.open.len()
    }

    /// Next event for a random customer
    pub fn step(&mut self) -> Cart {
        let customer_id = self.rng.gen_range(1..=self.customers);
        let item = self.random_item();

        let Some(mut cart) = self.open.remove(&customer_id) else {
            let cart = Cart {
                id: Uuid::new_v4().to_string(),
                customer_id,
                items: vec![item],
                status: CREATE_SHOPPING_CART.to_string(),
                timestamp: now_millis(),
                order_id: None,
            };
            self.open.insert(customer_id, cart.clone());
            return cart;
        };

        if self.rng.gen_bool(ADD_ITEM_PROBABILITY) {
            cart.items.push(item);
            cart.status = UPDATE_SHOPPING_CART.to_string();
            cart.timestamp = now_millis();
            self.open.insert(customer_id, cart.clone());
            cart
        } else {
            into_order(cart)
        }
    }

    /// Turn every open cart into an order
    pub fn drain(&mut self) -> Vec<Cart> {
        std::mem::take(&mut self.open)
            .into_values()
            .map(into_order)
            .collect()
    }

    fn random_item(&mut self) -> u32 {
        self.rng.gen_range(1..=MAX_ITEM_ID)
    }
}

fn into_order(mut cart: Cart) -> Cart {
    cart.status = CREATE_ORDER.to_string();
    cart.order_id = Some(Uuid::new_v4().to_string());
    cart.timestamp = now_millis();
    cart
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Wrap a cart snapshot in the event envelope stored in MongoDB
pub fn event_document(cart: &Cart) -> Result<Document> {
    let cart_data = bson::to_document(cart)
        .map_err(|e| OrderflowError::Serialization(format!("Failed to encode cart: {e}")))?;
    Ok(doc! {
        "_id": Uuid::new_v4().to_string(),
        "timestamp": now_millis(),
        "event_type": cart.status.as_str(),
        "cart_data": cart_data,
    })
}

/// Totals of a simulation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub rounds: usize,
    pub events: usize,
    pub orders: usize,
}

/// Insert cart events until shutdown or `max_rounds` rounds (0 = unbounded)
pub async fn run_simulation(
    sink: &dyn DocumentSink,
    settings: &SimulationSettings,
    shutdown: &watch::Receiver<bool>,
) -> Result<SimulationStats> {
    let mut shutdown = shutdown.clone();
    let mut simulator = CartSimulator::from_entropy(settings.customers);
    let mut stats = SimulationStats::default();

    tracing::info!(
        customers = settings.customers,
        events_per_round = settings.events_per_round,
        collection = %settings.events_collection,
        "Starting shopping cart simulation"
    );

    loop {
        match run_round(sink, settings, &mut simulator, &mut stats, &mut shutdown).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::error!(error = %e, "Simulation round failed");
                if !pause(ERROR_BACKOFF, &mut shutdown).await {
                    break;
                }
                continue;
            }
        }

        stats.rounds += 1;
        tracing::info!(round = stats.rounds, events = stats.events, "Completed simulation round");

        if settings.max_rounds > 0 && stats.rounds >= settings.max_rounds {
            break;
        }
        if !pause(settings.round_pause(), &mut shutdown).await {
            break;
        }
    }

    tracing::info!(
        rounds = stats.rounds,
        events = stats.events,
        orders = stats.orders,
        "Simulation stopped"
    );
    Ok(stats)
}

/// One round; `Ok(false)` when shutdown was requested
async fn run_round<R: Rng>(
    sink: &dyn DocumentSink,
    settings: &SimulationSettings,
    simulator: &mut CartSimulator<R>,
    stats: &mut SimulationStats,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<bool> {
    for _ in 0..settings.events_per_round {
        let cart = simulator.step();
        emit(sink, settings, &cart, stats).await?;
        if !pause(settings.event_interval(), shutdown).await {
            return Ok(false);
        }
    }

    for cart in simulator.drain() {
        emit(sink, settings, &cart, stats).await?;
        if !pause(settings.event_interval(), shutdown).await {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn emit(
    sink: &dyn DocumentSink,
    settings: &SimulationSettings,
    cart: &Cart,
    stats: &mut SimulationStats,
) -> Result<()> {
    sink.insert(SHOPPING_CART_DB, &settings.events_collection, event_document(cart)?)
        .await?;
    stats.events += 1;
    if cart.status == CREATE_ORDER {
        stats.orders += 1;
    }
    tracing::debug!(
        customer_id = cart.customer_id,
        event_type = %cart.status,
        items = cart.items.len(),
        "Inserted cart event"
    );
    Ok(())
}

/// Sleep unless shutdown comes first; `false` on shutdown
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = wait_for_shutdown(shutdown) => false,
    }
}
