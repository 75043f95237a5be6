//! Cart Models
//!
//! Cart totals are never stored: they are recomputed from the live product
//! price every time a cart is read.

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{
        carts::records::{CartItemUuid, CartRecord, CartUuid},
        products::records::ProductUuid,
    },
    identity::Identity,
};

/// Product fields shown next to a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub uuid: ProductUuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub price: u64,
    pub stock: u32,
}

/// Cart Item Model
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub product: ProductSummary,
    pub quantity: u32,
    pub total_price: u64,
    pub added_at: Timestamp,
}

impl CartItem {
    #[must_use]
    pub fn new(
        uuid: CartItemUuid,
        product: ProductSummary,
        quantity: u32,
        added_at: Timestamp,
    ) -> Self {
        let total_price = line_total(product.price, quantity);

        Self {
            uuid,
            product,
            quantity,
            total_price,
            added_at,
        }
    }
}

/// Cart Model
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub uuid: CartUuid,
    pub identity: Identity,
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub subtotal: u64,
    pub total: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// Assemble a cart view from its record and current lines.
    #[must_use]
    pub fn from_parts(record: CartRecord, items: Vec<CartItem>) -> Self {
        let total_items = total_items(&items);
        let subtotal = subtotal(&items);

        Self {
            uuid: record.uuid,
            identity: record.identity,
            items,
            total_items,
            subtotal,
            total: subtotal,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Price of `quantity` units at `price` each.
#[must_use]
pub fn line_total(price: u64, quantity: u32) -> u64 {
    price.saturating_mul(u64::from(quantity))
}

/// Sum of line quantities.
#[must_use]
pub fn total_items(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Sum of line totals.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> u64 {
    items
        .iter()
        .fold(0, |acc: u64, item| acc.saturating_add(item.total_price))
}
