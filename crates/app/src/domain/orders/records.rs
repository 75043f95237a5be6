//! Order Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::{
        orders::{number::OrderNumber, status::OrderStatus},
        products::records::ProductUuid,
    },
    identity::Identity,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method '{0}'")]
pub struct UnknownPaymentMethod(pub String);

/// Payment method chosen at checkout. No payment is taken by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
    CashOnDelivery,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "card" => Ok(Self::Card),
            "paypal" => Ok(Self::Paypal),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

pub const SHIPPING_NAME_MAX_CHARS: usize = 200;
pub const SHIPPING_CITY_MAX_CHARS: usize = 100;
pub const SHIPPING_POSTAL_CODE_MAX_CHARS: usize = 20;
pub const SHIPPING_COUNTRY_MAX_CHARS: usize = 100;
pub const SHIPPING_PHONE_MAX_CHARS: usize = 30;

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingInfo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingInfo {
    /// Whether every field carries a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.address,
            &self.city,
            &self.postal_code,
            &self.country,
            &self.phone,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Whether every field fits its column. The address is unbounded.
    #[must_use]
    pub fn fits_columns(&self) -> bool {
        [
            (&self.name, SHIPPING_NAME_MAX_CHARS),
            (&self.city, SHIPPING_CITY_MAX_CHARS),
            (&self.postal_code, SHIPPING_POSTAL_CODE_MAX_CHARS),
            (&self.country, SHIPPING_COUNTRY_MAX_CHARS),
            (&self.phone, SHIPPING_PHONE_MAX_CHARS),
        ]
        .iter()
        .all(|(field, max)| field.chars().count() <= *max)
    }
}

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
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
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
}

/// Order Item Record
///
/// Product fields are copied at purchase time and never follow later catalog
/// changes. `product_uuid` is cleared if the product row is removed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: Option<ProductUuid>,
    pub product_title: String,
    pub product_author: String,
    pub product_isbn: Option<String>,
    pub price: u64,
    pub quantity: u32,
    pub subtotal: u64,
    pub created_at: Timestamp,
}
