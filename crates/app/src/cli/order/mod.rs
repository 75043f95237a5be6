use clap::{Args, Subcommand};
use storefront_app::{
    config::{DatabaseConfig, OrdersConfig},
    context::AppContext,
    domain::orders::{models::Order, number::OrderNumber},
};

mod cancel;
mod show;
mod status;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    orders: OrdersConfig,

    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Print an order as JSON
    Show(show::ShowOrderArgs),

    /// Move an order to a new status
    Status(status::OrderStatusArgs),

    /// Cancel a pending order and return its stock
    Cancel(cancel::CancelOrderArgs),
}

/// Selects one order by its public number.
#[derive(Debug, Args)]
pub(crate) struct OrderTarget {
    /// Order number, e.g. ORD-20261018093012-K7QX2MNP
    #[arg(long)]
    order_number: OrderNumber,
}

pub(crate) async fn run(command: OrderCommand) -> Result<(), String> {
    let context = AppContext::from_config(&command.database, &command.orders)
        .await
        .map_err(|error| format!("failed to initialise services: {error}"))?;

    match command.command {
        OrderSubcommand::Show(args) => show::run(&context, args).await,
        OrderSubcommand::Status(args) => status::run(&context, args).await,
        OrderSubcommand::Cancel(args) => cancel::run(&context, args).await,
    }
}

fn print_order(order: &Order) -> Result<(), String> {
    let json = serde_json::to_string_pretty(order)
        .map_err(|error| format!("failed to serialize order: {error}"))?;

    println!("{json}");

    Ok(())
}
