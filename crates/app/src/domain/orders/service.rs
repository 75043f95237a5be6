//! Orders service.

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    clock::{Clock, SystemClock},
    database::Db,
    domain::{
        carts::{PgCartItemsRepository, PgCartsRepository, models::Cart},
        inventory::{InventoryError, PgInventoryRepository},
        orders::{
            data::{NewOrder, NewOrderItem, NewOrderRecord},
            errors::OrdersServiceError,
            models::{DEFAULT_SHIPPING_COST, Order, OrderTotals},
            number::{OrderNumber, OrderNumbers, RandomOrderNumbers},
            records::{OrderItemRecord, OrderRecord, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
            status::OrderStatus,
        },
    },
    identity::Identity,
};

/// Order number candidates tried before giving up.
pub const ORDER_NUMBER_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
    inventory_repository: PgInventoryRepository,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    shipping_cost: u64,
    clock: Arc<dyn Clock>,
    order_numbers: Arc<dyn OrderNumbers>,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
            inventory_repository: PgInventoryRepository::new(),
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            shipping_cost: DEFAULT_SHIPPING_COST,
            clock: Arc::new(SystemClock),
            order_numbers: Arc::new(RandomOrderNumbers),
        }
    }

    /// Flat shipping charge added to every new order, in minor units.
    #[must_use]
    pub fn with_shipping_cost(mut self, shipping_cost: u64) -> Self {
        self.shipping_cost = shipping_cost;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_order_numbers(mut self, order_numbers: Arc<dyn OrderNumbers>) -> Self {
        self.order_numbers = order_numbers;
        self
    }

    async fn load_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError> {
        Ok(self.items_repository.get_order_items(tx, &[order]).await?)
    }

    /// Insert the order row, drawing fresh numbers until one is free.
    async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
        new_order: &NewOrder,
        totals: OrderTotals,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let uuid = OrderUuid::new();

        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let order_number = self.order_numbers.generate(self.clock.now());

            let record = NewOrderRecord {
                uuid,
                order_number: &order_number,
                identity,
                payment_method: new_order.payment_method,
                totals,
                shipping: &new_order.shipping,
            };

            if let Some(order) = self.orders_repository.create_order(tx, &record).await? {
                return Ok(order);
            }

            debug!(attempt, %order_number, "order number already taken");
        }

        Err(OrdersServiceError::OrderNumberExhausted {
            attempts: ORDER_NUMBER_ATTEMPTS,
        })
    }
}

impl Debug for PgOrdersService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("shipping_cost", &self.shipping_cost)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, new_order),
        fields(identity = %identity, payment_method = %new_order.payment_method)
    )]
    async fn create_order(
        &self,
        identity: &Identity,
        new_order: NewOrder,
    ) -> Result<Order, OrdersServiceError> {
        if !new_order.shipping.is_complete() {
            return Err(OrdersServiceError::MissingRequiredData);
        }

        if !new_order.shipping.fits_columns() {
            return Err(OrdersServiceError::InvalidData);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self
            .carts_repository
            .find_cart(&mut tx, identity)
            .await?
            .ok_or(OrdersServiceError::EmptyCart)?;

        let cart = self.carts_repository.lock_cart(&mut tx, cart.uuid).await?;
        let items = self
            .cart_items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;
        let mut cart = Cart::from_parts(cart, items);

        if cart.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        // Concurrent checkouts take product row locks in the same order.
        cart.items.sort_by_key(|line| line.product.uuid);

        for line in &cart.items {
            self.inventory_repository
                .reserve(&mut tx, line.product.uuid, line.quantity)
                .await?;
        }

        let totals = OrderTotals::new(cart.subtotal, self.shipping_cost, 0);

        let record = self
            .insert_order(&mut tx, identity, &new_order, totals)
            .await?;

        let mut items = Vec::with_capacity(cart.items.len());

        for line in &cart.items {
            let item = self
                .items_repository
                .create_order_item(&mut tx, record.uuid, NewOrderItem::from(line))
                .await?;

            items.push(item);
        }

        self.cart_items_repository
            .clear_cart_items(&mut tx, cart.uuid)
            .await?;
        self.carts_repository.touch_cart(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        info!(
            order_uuid = %record.uuid,
            order_number = %record.order_number,
            total = record.total,
            items = items.len(),
            "created order"
        );

        Ok(Order::from_parts(record, items))
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders_repository.get_order(&mut tx, order).await?;
        let items = self.load_items(&mut tx, order).await?;

        tx.commit().await?;

        Ok(Order::from_parts(record, items))
    }

    async fn get_order_by_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .orders_repository
            .get_order_by_number(&mut tx, order_number)
            .await?;
        let items = self.load_items(&mut tx, record.uuid).await?;

        tx.commit().await?;

        Ok(Order::from_parts(record, items))
    }

    async fn list_orders(&self, identity: &Identity) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self.orders_repository.list_orders(&mut tx, identity).await?;

        let uuids: Vec<OrderUuid> = records.iter().map(|record| record.uuid).collect();

        let mut items_by_order: HashMap<OrderUuid, Vec<OrderItemRecord>> = HashMap::new();

        for item in self.items_repository.get_order_items(&mut tx, &uuids).await? {
            items_by_order.entry(item.order_uuid).or_default().push(item);
        }

        tx.commit().await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let items = items_by_order.remove(&record.uuid).unwrap_or_default();

                Order::from_parts(record, items)
            })
            .collect())
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_uuid = %order, to = %to)
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        if to == OrderStatus::Cancelled {
            return self.cancel_order(order).await;
        }

        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;

        if !current.status.can_transition_to(to) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        let delivered_at = (to == OrderStatus::Delivered).then(|| self.clock.now());

        let record = self
            .orders_repository
            .update_status(&mut tx, order, to, delivered_at)
            .await?;
        let items = self.load_items(&mut tx, order).await?;

        tx.commit().await?;

        info!(from = %current.status, to = %record.status, "updated order status");

        Ok(Order::from_parts(record, items))
    }

    #[tracing::instrument(name = "orders.service.cancel_order", skip(self), fields(order_uuid = %order))]
    async fn cancel_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;

        if current.status != OrderStatus::Pending {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: OrderStatus::Cancelled,
            });
        }

        let items = self.load_items(&mut tx, order).await?;

        for item in &items {
            let Some(product) = item.product_uuid else {
                continue;
            };

            match self
                .inventory_repository
                .release(&mut tx, product, item.quantity)
                .await
            {
                Ok(_) => {}
                Err(InventoryError::ProductNotFound { product }) => {
                    debug!(product_uuid = %product, "product gone, skipping stock release");
                }
                Err(error) => return Err(error.into()),
            }
        }

        let record = self
            .orders_repository
            .update_status(&mut tx, order, OrderStatus::Cancelled, None)
            .await?;

        tx.commit().await?;

        info!(order_number = %record.order_number, "cancelled order");

        Ok(Order::from_parts(record, items))
    }
}

/// Checkout and order lifecycle.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the identity's cart into a pending order.
    ///
    /// Reserves stock for every line and empties the cart, all or nothing.
    async fn create_order(
        &self,
        identity: &Identity,
        new_order: NewOrder,
    ) -> Result<Order, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Retrieve a single order by its public number.
    async fn get_order_by_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Order, OrdersServiceError>;

    /// The identity's orders, newest first.
    async fn list_orders(&self, identity: &Identity) -> Result<Vec<Order>, OrdersServiceError>;

    /// Move an order along its fulfilment track.
    async fn update_status(
        &self,
        order: OrderUuid,
        to: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Cancel a pending order and return its stock.
    async fn cancel_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;
}
