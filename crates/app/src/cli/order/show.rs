use clap::Args;
use storefront_app::context::AppContext;

use super::{OrderTarget, print_order};

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    #[command(flatten)]
    target: OrderTarget,
}

pub(crate) async fn run(context: &AppContext, args: ShowOrderArgs) -> Result<(), String> {
    let order = context
        .orders
        .get_order_by_number(&args.target.order_number)
        .await
        .map_err(|error| format!("failed to load order {}: {error}", args.target.order_number))?;

    print_order(&order)
}
