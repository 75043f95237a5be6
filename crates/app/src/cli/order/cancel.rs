use clap::Args;
use storefront_app::context::AppContext;

use super::{OrderTarget, print_order};

#[derive(Debug, Args)]
pub(crate) struct CancelOrderArgs {
    #[command(flatten)]
    target: OrderTarget,
}

pub(crate) async fn run(context: &AppContext, args: CancelOrderArgs) -> Result<(), String> {
    let number = &args.target.order_number;

    let order = context
        .orders
        .get_order_by_number(number)
        .await
        .map_err(|error| format!("failed to load order {number}: {error}"))?;

    let order = context
        .orders
        .cancel_order(order.uuid)
        .await
        .map_err(|error| format!("failed to cancel order {number}: {error}"))?;

    print_order(&order)
}
