use clap::Args;
use storefront_app::{context::AppContext, domain::orders::status::OrderStatus};

use super::{OrderTarget, print_order};

#[derive(Debug, Args)]
pub(crate) struct OrderStatusArgs {
    #[command(flatten)]
    target: OrderTarget,

    /// Target status (processing, shipped, delivered, cancelled)
    #[arg(long)]
    status: OrderStatus,
}

pub(crate) async fn run(context: &AppContext, args: OrderStatusArgs) -> Result<(), String> {
    let number = &args.target.order_number;

    let order = context
        .orders
        .get_order_by_number(number)
        .await
        .map_err(|error| format!("failed to load order {number}: {error}"))?;

    let order = context
        .orders
        .update_status(order.uuid, args.status)
        .await
        .map_err(|error| format!("failed to update order {number}: {error}"))?;

    print_order(&order)
}
