//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{amount_param, try_get_amount},
    domain::orders::{
        data::NewOrderRecord,
        number::OrderNumber,
        records::{OrderRecord, OrderUuid, PaymentMethod, ShippingInfo},
        status::OrderStatus,
    },
    identity::Identity,
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/get_order_by_number.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_BY_USER_SQL: &str = include_str!("../sql/list_orders_by_user.sql");
const LIST_ORDERS_BY_SESSION_SQL: &str = include_str!("../sql/list_orders_by_session.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a pending order.
    ///
    /// Returns `None` when the order number is already taken, leaving the
    /// transaction usable so the caller can retry with a new number.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrderRecord<'_>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let (user_uuid, session_key) = order.identity.columns();

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.order_number.as_str())
            .bind(user_uuid)
            .bind(session_key)
            .bind(order.payment_method.as_str())
            .bind(amount_param(order.totals.subtotal, "subtotal")?)
            .bind(amount_param(order.totals.shipping_cost, "shipping_cost")?)
            .bind(amount_param(order.totals.discount, "discount")?)
            .bind(amount_param(order.totals.total, "total")?)
            .bind(order.shipping.name.as_str())
            .bind(order.shipping.address.as_str())
            .bind(order.shipping.city.as_str())
            .bind(order.shipping.postal_code.as_str())
            .bind(order.shipping.country.as_str())
            .bind(order.shipping.phone.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_number: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_BY_NUMBER_SQL)
            .bind(order_number.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Read an order and hold its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        match identity {
            Identity::User(user) => {
                query_as::<Postgres, OrderRecord>(LIST_ORDERS_BY_USER_SQL)
                    .bind(user.into_uuid())
                    .fetch_all(&mut **tx)
                    .await
            }
            Identity::Session(key) => {
                query_as::<Postgres, OrderRecord>(LIST_ORDERS_BY_SESSION_SQL)
                    .bind(key.as_str())
                    .fetch_all(&mut **tx)
                    .await
            }
        }
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        delivered_at: Option<Timestamp>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(delivered_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }
}

fn decode_error(col: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let identity = Identity::from_columns(row.try_get("user_uuid")?, row.try_get("session_key")?)
            .ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "user_uuid".to_string(),
                source: "order must belong to exactly one identity".into(),
            })?;

        let status = row
            .try_get::<&str, _>("status")?
            .parse::<OrderStatus>()
            .map_err(|e| decode_error("status", e))?;

        let payment_method = row
            .try_get::<&str, _>("payment_method")?
            .parse::<PaymentMethod>()
            .map_err(|e| decode_error("payment_method", e))?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: OrderNumber::from_column(row.try_get("order_number")?),
            identity,
            status,
            payment_method,
            subtotal: try_get_amount(row, "subtotal")?,
            shipping_cost: try_get_amount(row, "shipping_cost")?,
            discount: try_get_amount(row, "discount")?,
            total: try_get_amount(row, "total")?,
            shipping: ShippingInfo {
                name: row.try_get("shipping_name")?,
                address: row.try_get("shipping_address")?,
                city: row.try_get("shipping_city")?,
                postal_code: row.try_get("shipping_postal_code")?,
                country: row.try_get("shipping_country")?,
                phone: row.try_get("shipping_phone")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
