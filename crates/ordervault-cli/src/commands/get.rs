//! Order lookup command
//!
//! Usage: ordervault get <ORDER_UID>

use clap::Args;
use ordervault_core::core_types::OpContext;
use ordervault_core::OrderStore;
use ordervault_engine::OrderRepository;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Order uid to look up
    pub order_uid: String,
}

/// Execute get
pub fn execute<S: OrderStore>(
    repo: &OrderRepository<S>,
    ctx: &OpContext,
    args: GetArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    match repo.find(ctx, &args.order_uid)? {
        Some(order) => println!("{}", serde_json::to_string_pretty(order.as_ref())?),
        None => println!("Order {} does not exist", args.order_uid),
    }
    Ok(())
}
