//! Orders Config

use clap::Args;

use crate::domain::orders::models::DEFAULT_SHIPPING_COST;

/// Checkout settings.
#[derive(Debug, Clone, Args)]
pub struct OrdersConfig {
    /// Flat shipping cost added to every order, in minor currency units
    #[arg(long, env = "SHIPPING_COST", default_value_t = DEFAULT_SHIPPING_COST)]
    pub shipping_cost: u64,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            shipping_cost: DEFAULT_SHIPPING_COST,
        }
    }
}
