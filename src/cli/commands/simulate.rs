//! Shopping simulation command

use super::{CommandContext, EXIT_INTERRUPTED, EXIT_SUCCESS};
use crate::adapters::mongo::MongoAdmin;
use crate::core::shutdown::is_shutdown_requested;
use crate::core::simulate::run_simulation;
use crate::domain::Result;

const SIMULATION_INFO: &str = "
What will happen:
1. Customers will add items to shopping carts
2. The Stream Processor will detect when carts are ready for checkout
3. The order service will receive order requests and process them
4. You'll see order processing logs in the order service terminal
5. All events will be recorded in the order history database

Use Ctrl+C to stop the simulation when you've seen enough events
";

pub async fn simulate_shopping(ctx: &mut CommandContext) -> Result<i32> {
    let rule = "=".repeat(80);
    println!("\n{rule}\nStarting Shopping Simulation\n{rule}");
    println!("{SIMULATION_INFO}");

    let mongo = MongoAdmin::from_store(&ctx.store).await?;
    let stats = run_simulation(&mongo, &ctx.settings.simulation, &ctx.shutdown).await?;

    println!(
        "\n✅ Simulation finished: {} rounds, {} events, {} orders",
        stats.rounds, stats.events, stats.orders
    );

    if is_shutdown_requested(&ctx.shutdown) {
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
