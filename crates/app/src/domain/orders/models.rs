//! Order Models

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::orders::{
        number::OrderNumber,
        records::{OrderItemRecord, OrderRecord, OrderUuid, PaymentMethod, ShippingInfo},
        status::OrderStatus,
    },
    identity::Identity,
};

/// Shipping charged on every order, in minor units (5.00).
pub const DEFAULT_SHIPPING_COST: u64 = 5_00;

/// Monetary totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: u64,
    pub shipping_cost: u64,
    pub discount: u64,
    pub total: u64,
}

impl OrderTotals {
    /// `total = subtotal + shipping_cost - discount`, floored at zero.
    #[must_use]
    pub fn new(subtotal: u64, shipping_cost: u64, discount: u64) -> Self {
        let discount = discount.min(subtotal.saturating_add(shipping_cost));

        Self {
            subtotal,
            shipping_cost,
            discount,
            total: subtotal.saturating_add(shipping_cost) - discount,
        }
    }
}

/// Order Model
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub identity: Identity,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: u64,
    pub shipping_cost: u64,
    pub discount: u64,
    pub total: u64,
    pub shipping: ShippingInfo,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
}

impl Order {
    #[must_use]
    pub fn from_parts(record: OrderRecord, items: Vec<OrderItemRecord>) -> Self {
        Self {
            uuid: record.uuid,
            order_number: record.order_number,
            identity: record.identity,
            status: record.status,
            payment_method: record.payment_method,
            subtotal: record.subtotal,
            shipping_cost: record.shipping_cost,
            discount: record.discount,
            total: record.total,
            shipping: record.shipping,
            items,
            created_at: record.created_at,
            updated_at: record.updated_at,
            delivered_at: record.delivered_at,
        }
    }
}
