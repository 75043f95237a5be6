//! Inventory errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::products::records::ProductUuid;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("product {product} not found")]
    ProductNotFound { product: ProductUuid },

    #[error("insufficient stock for product {product}: {available} available")]
    InsufficientStock {
        product: ProductUuid,
        available: u32,
    },

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InventoryError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
