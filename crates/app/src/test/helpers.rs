//! Test Helpers

use crate::domain::{
    carts::models::{Cart, CartItem},
    orders::{
        data::NewOrder,
        models::{Order, OrderTotals},
        records::{PaymentMethod, ShippingInfo},
    },
    products::{data::NewProduct, records::ProductUuid},
};

pub(crate) fn new_product(uuid: ProductUuid, price: u64, stock: u32) -> NewProduct {
    NewProduct {
        uuid,
        title: format!("Book {uuid}"),
        author: "Test Author".to_string(),
        isbn: None,
        price,
        stock,
        is_active: true,
    }
}

pub(crate) fn shipping() -> ShippingInfo {
    ShippingInfo {
        name: "Ada Reader".to_string(),
        address: "1 Library Lane".to_string(),
        city: "Bookham".to_string(),
        postal_code: "BK1 2AB".to_string(),
        country: "GB".to_string(),
        phone: "+44 20 7946 0000".to_string(),
    }
}

pub(crate) fn new_order() -> NewOrder {
    NewOrder {
        payment_method: PaymentMethod::Card,
        shipping: shipping(),
    }
}

/// The cart line holding `product`, if any.
pub(crate) fn cart_line(cart: &Cart, product: ProductUuid) -> Option<&CartItem> {
    cart.items.iter().find(|item| item.product.uuid == product)
}

/// Whether the stored totals agree with each other and with the items.
pub(crate) fn order_is_consistent(order: &Order) -> bool {
    let items_subtotal = order
        .items
        .iter()
        .fold(0_u64, |acc, item| acc.saturating_add(item.subtotal));

    let stored = OrderTotals {
        subtotal: order.subtotal,
        shipping_cost: order.shipping_cost,
        discount: order.discount,
        total: order.total,
    };

    items_subtotal == order.subtotal
        && OrderTotals::new(order.subtotal, order.shipping_cost, order.discount) == stored
}
