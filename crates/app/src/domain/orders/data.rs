//! Order Data

use crate::{
    domain::{
        carts::models::CartItem,
        orders::{
            models::OrderTotals,
            number::OrderNumber,
            records::{OrderItemUuid, OrderUuid, PaymentMethod, ShippingInfo},
        },
        products::records::ProductUuid,
    },
    identity::Identity,
};

/// Checkout request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub payment_method: PaymentMethod,
    pub shipping: ShippingInfo,
}

/// Order row to insert.
#[derive(Debug, Clone)]
pub(crate) struct NewOrderRecord<'a> {
    pub uuid: OrderUuid,
    pub order_number: &'a OrderNumber,
    pub identity: &'a Identity,
    pub payment_method: PaymentMethod,
    pub totals: OrderTotals,
    pub shipping: &'a ShippingInfo,
}

/// Order line to insert, frozen from a cart line.
#[derive(Debug, Clone)]
pub(crate) struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub product_title: String,
    pub product_author: String,
    pub product_isbn: Option<String>,
    pub price: u64,
    pub quantity: u32,
    pub subtotal: u64,
}

impl From<&CartItem> for NewOrderItem {
    fn from(line: &CartItem) -> Self {
        Self {
            uuid: OrderItemUuid::new(),
            product_uuid: line.product.uuid,
            product_title: line.product.title.clone(),
            product_author: line.product.author.clone(),
            product_isbn: line.product.isbn.clone(),
            price: line.product.price,
            quantity: line.quantity,
            subtotal: line.total_price,
        }
    }
}
