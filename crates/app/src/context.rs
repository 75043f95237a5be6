//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{DatabaseConfig, OrdersConfig},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        inventory::{InventoryService, PgInventoryService},
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Every service, sharing one connection pool.
#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
}

impl AppContext {
    #[must_use]
    pub fn new(db: Db, orders: &OrdersConfig) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db).with_shipping_cost(orders.shipping_cost)),
        }
    }

    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_config(
        database: &DatabaseConfig,
        orders: &OrdersConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(&database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::new(Db::new(pool), orders))
    }
}
