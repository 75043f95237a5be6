//! Inventory service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        inventory::{errors::InventoryError, repository::PgInventoryRepository},
        products::records::ProductUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgInventoryRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInventoryRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    #[tracing::instrument(name = "inventory.service.reserve", skip(self), fields(product_uuid = %product))]
    async fn reserve(&self, product: ProductUuid, quantity: u32) -> Result<u32, InventoryError> {
        let mut tx = self.db.begin_transaction().await?;

        let remaining = self.repository.reserve(&mut tx, product, quantity).await?;

        tx.commit().await?;

        info!(product_uuid = %product, quantity, remaining, "reserved stock");

        Ok(remaining)
    }

    #[tracing::instrument(name = "inventory.service.release", skip(self), fields(product_uuid = %product))]
    async fn release(&self, product: ProductUuid, quantity: u32) -> Result<u32, InventoryError> {
        let mut tx = self.db.begin_transaction().await?;

        let level = self.repository.release(&mut tx, product, quantity).await?;

        tx.commit().await?;

        info!(product_uuid = %product, quantity, level, "released stock");

        Ok(level)
    }
}

/// Atomic stock reservation and restitution.
#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Decrements stock, failing with `InsufficientStock` instead of going
    /// below zero. Returns the remaining stock.
    async fn reserve(&self, product: ProductUuid, quantity: u32) -> Result<u32, InventoryError>;

    /// Increments stock. Fails with `ProductNotFound` when the product no
    /// longer exists. Returns the new stock level.
    async fn release(&self, product: ProductUuid, quantity: u32) -> Result<u32, InventoryError>;
}
