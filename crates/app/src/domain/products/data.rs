//! Products Data

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub price: u64,
    pub stock: u32,
    pub is_active: bool,
}

/// Product Update Data
///
/// Stock is deliberately absent: it only changes through the inventory store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub price: u64,
    pub is_active: bool,
}
