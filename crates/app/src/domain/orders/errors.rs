//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    inventory::InventoryError, orders::status::OrderStatus, products::records::ProductUuid,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("cart is empty")]
    EmptyCart,

    #[error("product {product} not found")]
    ProductNotFound { product: ProductUuid },

    #[error("insufficient stock for product {product}: {available} available")]
    InsufficientStock {
        product: ProductUuid,
        available: u32,
    },

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("could not generate a unique order number after {attempts} attempts")]
    OrderNumberExhausted { attempts: u32 },

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<InventoryError> for OrdersServiceError {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::ProductNotFound { product } => Self::ProductNotFound { product },
            InventoryError::InsufficientStock { product, available } => {
                Self::InsufficientStock { product, available }
            }
            InventoryError::InvalidQuantity => Self::InvalidData,
            InventoryError::Sql(error) => error.into(),
        }
    }
}
