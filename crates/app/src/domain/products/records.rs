//! Product Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,

    /// Unit price in minor currency units.
    pub price: u64,

    pub stock: u32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProductRecord {
    /// Whether the product can currently be sold.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}
