//! Client for the order service's history endpoint

use crate::domain::{OrderflowError, Result};
use reqwest::{Client, ClientBuilder, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

/// Header that suppresses ngrok's browser interstitial
pub const NGROK_SKIP_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Outcome of an order-history lookup
#[derive(Debug, Clone, PartialEq)]
pub enum OrderHistory {
    Found(Value),
    /// Non-200 answer with its raw body
    Unavailable { status: u16, body: String },
}

/// Order service HTTP client
pub struct OrderServiceClient {
    client: Client,
    base_url: String,
}

impl OrderServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| {
            OrderflowError::Configuration(format!("Invalid order service URL '{base_url}': {e}"))
        })?;
        let client = ClientBuilder::new().timeout(timeout).build().map_err(|e| {
            OrderflowError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    fn history_url(&self, order_id: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/getOrderHistory", self.base_url))
            .map_err(|e| OrderflowError::Configuration(e.to_string()))?;
        url.query_pairs_mut().append_pair("orderId", order_id);
        Ok(url)
    }

    /// Fetch the history of one order
    pub async fn order_history(&self, order_id: &str) -> Result<OrderHistory> {
        let url = self.history_url(order_id)?;
        tracing::debug!(url = %url, "Fetching order history");

        let response = self
            .client
            .get(url)
            .header(NGROK_SKIP_WARNING_HEADER, "true")
            .send()
            .await
            .map_err(|e| OrderflowError::Other(format!("Order service unreachable: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::OK {
            let json = serde_json::from_str(&body)?;
            Ok(OrderHistory::Found(json))
        } else {
            Ok(OrderHistory::Unavailable {
                status: status.as_u16(),
                body,
            })
        }
    }
}
