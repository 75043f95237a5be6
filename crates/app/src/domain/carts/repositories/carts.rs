//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    domain::carts::records::{CartRecord, CartUuid},
    identity::Identity,
};

const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const FIND_CART_BY_USER_SQL: &str = include_str!("../sql/find_cart_by_user.sql");
const FIND_CART_BY_SESSION_SQL: &str = include_str!("../sql/find_cart_by_session.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const TOUCH_CART_SQL: &str = include_str!("../sql/touch_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a cart for `identity` unless one already exists.
    ///
    /// Concurrent callers for the same identity race on the unique key; the
    /// loser's insert becomes a no-op.
    pub(crate) async fn create_cart_if_absent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        identity: &Identity,
    ) -> Result<u64, sqlx::Error> {
        let (user_uuid, session_key) = identity.columns();

        let rows_affected = query(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(user_uuid)
            .bind(session_key)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        match identity {
            Identity::User(user) => {
                query_as::<Postgres, CartRecord>(FIND_CART_BY_USER_SQL)
                    .bind(user.into_uuid())
                    .fetch_optional(&mut **tx)
                    .await
            }
            Identity::Session(key) => {
                query_as::<Postgres, CartRecord>(FIND_CART_BY_SESSION_SQL)
                    .bind(key.as_str())
                    .fetch_optional(&mut **tx)
                    .await
            }
        }
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Read a cart and hold its row lock until the transaction ends.
    ///
    /// Every operation that reads or writes a cart's item set takes this lock
    /// first, which serializes checkout against concurrent cart edits.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(LOCK_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn touch_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let identity = Identity::from_columns(row.try_get("user_uuid")?, row.try_get("session_key")?)
            .ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "user_uuid".to_string(),
                source: "cart must belong to exactly one identity".into(),
            })?;

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            identity,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
