//! Order history lookup

use super::{CommandContext, EXIT_FAILURE, EXIT_SUCCESS};
use crate::adapters::order_service::{OrderHistory, OrderServiceClient};
use crate::config::variables::ORDER_SERVICE_URL;
use crate::domain::{OrderflowError, Result};

/// `get-order-history [ORDER_ID]`, prompting for the ID when it is not given
pub async fn get_order_history(ctx: &mut CommandContext, args: &[String]) -> Result<i32> {
    let order_id = match args.first() {
        Some(id) => id.trim().to_string(),
        None => ctx.prompter.input("Enter Order ID")?.trim().to_string(),
    };
    if order_id.is_empty() {
        return Err(OrderflowError::Validation("an order ID is required".to_string()));
    }

    let client = OrderServiceClient::new(
        ctx.store.require(ORDER_SERVICE_URL)?,
        ctx.settings.atlas.request_timeout(),
    )?;

    match client.order_history(&order_id).await? {
        OrderHistory::Found(history) => {
            let pretty = serde_json::to_string_pretty(&history)?;
            println!("{pretty}");
            Ok(EXIT_SUCCESS)
        }
        OrderHistory::Unavailable { status, body } => {
            println!("❌ Order service answered with status {status}");
            println!("{body}");
            Ok(EXIT_FAILURE)
        }
    }
}
