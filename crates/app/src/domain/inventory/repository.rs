//! Inventory Repository

use sqlx::{Postgres, Transaction, query_scalar};

use crate::{
    database::count_param,
    domain::{inventory::errors::InventoryError, products::records::ProductUuid},
};

const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const RELEASE_STOCK_SQL: &str = include_str!("sql/release_stock.sql");
const AVAILABLE_STOCK_SQL: &str = include_str!("sql/available_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Decrement stock by `quantity`, returning the new level.
    ///
    /// Inactive, deleted and missing products report zero available stock.
    pub(crate) async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<u32, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity);
        }

        let remaining: Option<i32> = query_scalar(RESERVE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(count_param(quantity, "quantity")?)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(remaining) = remaining {
            return Ok(stock_level(remaining));
        }

        let available: Option<i32> = query_scalar(AVAILABLE_STOCK_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Err(InventoryError::InsufficientStock {
            product,
            available: available.map_or(0, stock_level),
        })
    }

    /// Increment stock by `quantity`, returning the new level.
    pub(crate) async fn release(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<u32, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity);
        }

        let level: Option<i32> = query_scalar(RELEASE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(count_param(quantity, "quantity")?)
            .fetch_optional(&mut **tx)
            .await?;

        level
            .map(stock_level)
            .ok_or(InventoryError::ProductNotFound { product })
    }
}

// The `stock >= 0` check constraint keeps the column non-negative.
fn stock_level(stock: i32) -> u32 {
    u32::try_from(stock).unwrap_or(0)
}
