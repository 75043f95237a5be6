//! Test context for service-level integration tests.

use sqlx::query_scalar;
use testresult::TestResult;

use crate::{
    database::Db,
    domain::{
        carts::{CartsService, PgCartsService},
        inventory::PgInventoryService,
        orders::{OrdersService, PgOrdersService, models::Order},
        products::{
            PgProductsService, ProductsService,
            records::{ProductRecord, ProductUuid},
        },
    },
    identity::{Identity, SessionKey},
    test::helpers::{new_order, new_product},
};

use super::db::TestDb;

pub(crate) struct TestContext {
    pub db: Db,
    pub products: PgProductsService,
    pub inventory: PgInventoryService,
    pub carts: PgCartsService,
    pub orders: PgOrdersService,

    // Keeps the database alive for the duration of the test.
    _test_db: TestDb,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            inventory: PgInventoryService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            orders: PgOrdersService::new(db.clone()),
            db,
            _test_db: test_db,
        }
    }

    /// Create an active product with the given price and stock.
    pub async fn create_product(&self, price: u64, stock: u32) -> ProductRecord {
        self.products
            .create_product(new_product(ProductUuid::new(), price, stock))
            .await
            .expect("Failed to create test product")
    }

    /// Current stock straight from the table, including deleted products.
    pub async fn stock_of(&self, product: ProductUuid) -> u32 {
        let stock: i32 = query_scalar("SELECT stock FROM products WHERE uuid = $1")
            .bind(product.into_uuid())
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to read product stock");

        u32::try_from(stock).expect("stock is never negative")
    }

    /// Check out `quantity` units of a new product for a new session.
    pub async fn place_order(&self, price: u64, stock: u32, quantity: u32) -> TestResult<Order> {
        let product = self.create_product(price, stock).await;
        let identity = Identity::Session(SessionKey::generate());
        let cart = self.carts.get_or_create_cart(&identity).await?;

        self.carts.add_item(cart.uuid, product.uuid, quantity).await?;

        Ok(self.orders.create_order(&identity, new_order()).await?)
    }
}
