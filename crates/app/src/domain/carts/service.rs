//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::Cart,
            records::{CartItemUuid, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        products::{PgProductsRepository, records::ProductUuid},
    },
    identity::Identity,
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    async fn load_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, CartsServiceError> {
        let record = self.carts_repository.get_cart(tx, cart).await?;
        let items = self.items_repository.get_cart_items(tx, cart).await?;

        Ok(Cart::from_parts(record, items))
    }

    /// Check `quantity` against the product's live stock, share-locking the
    /// product row for the rest of the transaction.
    async fn ensure_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        let record = self
            .products_repository
            .lock_product(tx, product)
            .await?
            .filter(|record| record.is_available())
            .ok_or(CartsServiceError::ProductNotFound { product })?;

        if quantity > record.stock {
            return Err(CartsServiceError::InsufficientStock {
                product,
                available: record.stock,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.get_or_create_cart",
        skip(self),
        fields(identity = %identity)
    )]
    async fn get_or_create_cart(&self, identity: &Identity) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .carts_repository
            .create_cart_if_absent(&mut tx, CartUuid::new(), identity)
            .await?;

        let record = self
            .carts_repository
            .find_cart(&mut tx, identity)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, record.uuid)
            .await?;

        tx.commit().await?;

        if created > 0 {
            info!(cart_uuid = %record.uuid, "created cart");
        }

        Ok(Cart::from_parts(record, items))
    }

    async fn get_cart(&self, cart: CartUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self),
        fields(cart_uuid = %cart, product_uuid = %product)
    )]
    async fn add_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        self.carts_repository.lock_cart(&mut tx, cart).await?;

        let existing = self
            .items_repository
            .find_cart_item_by_product(&mut tx, cart, product)
            .await?
            .map_or(0, |item| item.quantity);

        // An overflowing sum can never fit in stock either.
        let combined = existing.saturating_add(quantity);

        self.ensure_stock(&mut tx, product, combined).await?;

        let item = self
            .items_repository
            .upsert_cart_item(&mut tx, cart, product, combined)
            .await?;

        self.carts_repository.touch_cart(&mut tx, cart).await?;

        let view = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        info!(cart_item_uuid = %item.uuid, quantity = combined, "added item to cart");

        Ok(view)
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self),
        fields(cart_uuid = %cart, cart_item_uuid = %item)
    )]
    async fn update_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.carts_repository.lock_cart(&mut tx, cart).await?;

        let record = self
            .items_repository
            .find_cart_item(&mut tx, cart, item)
            .await?
            .ok_or(CartsServiceError::ItemNotFound)?;

        // Non-positive quantities mean removal, before any stock comparison.
        if quantity <= 0 {
            self.items_repository
                .delete_cart_item(&mut tx, cart, item)
                .await?;
        } else {
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

            self.ensure_stock(&mut tx, record.product_uuid, quantity)
                .await?;

            self.items_repository
                .update_cart_item_quantity(&mut tx, cart, item, quantity)
                .await?;
        }

        self.carts_repository.touch_cart(&mut tx, cart).await?;

        let view = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        info!(quantity, "updated cart item");

        Ok(view)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(cart_uuid = %cart, cart_item_uuid = %item)
    )]
    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.carts_repository.lock_cart(&mut tx, cart).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::ItemNotFound);
        }

        self.carts_repository.touch_cart(&mut tx, cart).await?;

        let view = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        info!("removed cart item");

        Ok(view)
    }

    #[tracing::instrument(name = "carts.service.clear", skip(self), fields(cart_uuid = %cart))]
    async fn clear(&self, cart: CartUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.carts_repository.lock_cart(&mut tx, cart).await?;

        let removed = self.items_repository.clear_cart_items(&mut tx, cart).await?;

        if removed > 0 {
            self.carts_repository.touch_cart(&mut tx, cart).await?;
        }

        let view = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        info!(removed, "cleared cart");

        Ok(view)
    }
}

/// Shopping cart operations. None of them change stock.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Return the identity's cart, creating an empty one on first use.
    async fn get_or_create_cart(&self, identity: &Identity) -> Result<Cart, CartsServiceError>;

    /// Retrieve a single cart.
    async fn get_cart(&self, cart: CartUuid) -> Result<Cart, CartsServiceError>;

    /// Add `quantity` units of a product, merging with an existing line.
    async fn add_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Set a line's quantity; zero or less removes the line.
    async fn update_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line from the cart.
    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove every line from the cart.
    async fn clear(&self, cart: CartUuid) -> Result<Cart, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::products::{ProductsService, data::ProductUpdate},
        identity::{SessionKey, UserUuid},
        test::{TestContext, helpers::cart_line},
    };

    use super::*;

    fn session() -> Identity {
        Identity::Session(SessionKey::generate())
    }

    #[tokio::test]
    async fn get_or_create_cart_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let identity = session();

        let first = ctx.carts.get_or_create_cart(&identity).await?;
        let second = ctx.carts.get_or_create_cart(&identity).await?;

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.identity, identity);
        assert!(second.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_get_or_create_cart_yields_one_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let identity = Identity::User(UserUuid::new());

        let (a, b) = tokio::join!(
            ctx.carts.get_or_create_cart(&identity),
            ctx.carts.get_or_create_cart(&identity),
        );

        assert_eq!(a?.uuid, b?.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn user_and_session_carts_are_distinct() -> TestResult {
        let ctx = TestContext::new().await;

        let user_cart = ctx
            .carts
            .get_or_create_cart(&Identity::User(UserUuid::new()))
            .await?;
        let session_cart = ctx.carts.get_or_create_cart(&session()).await?;

        assert_ne!(user_cart.uuid, session_cart.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.carts.get_cart(CartUuid::new()).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn add_item_merges_quantities_for_same_product() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(10_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;

        ctx.carts.add_item(cart.uuid, product.uuid, 1).await?;
        let cart = ctx.carts.add_item(cart.uuid, product.uuid, 2).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.subtotal, 30_00);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_orders_lines_most_recent_first() -> TestResult {
        let ctx = TestContext::new().await;
        let older = ctx.create_product(1_00, 5).await;
        let newer = ctx.create_product(2_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;

        ctx.carts.add_item(cart.uuid, older.uuid, 1).await?;
        let cart = ctx.carts.add_item(cart.uuid, newer.uuid, 1).await?;

        let order: Vec<ProductUuid> = cart.items.iter().map(|item| item.product.uuid).collect();

        assert_eq!(order, vec![newer.uuid, older.uuid]);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_zero_quantity_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;

        let result = ctx.carts.add_item(cart.uuid, product.uuid, 0).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unknown_or_inactive_product_returns_product_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;

        let unknown = ctx.carts.add_item(cart.uuid, ProductUuid::new(), 1).await;

        assert!(
            matches!(unknown, Err(CartsServiceError::ProductNotFound { .. })),
            "expected ProductNotFound, got {unknown:?}"
        );

        let product = ctx.create_product(1_00, 5).await;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    title: product.title.clone(),
                    author: product.author.clone(),
                    isbn: None,
                    price: product.price,
                    is_active: false,
                },
            )
            .await?;

        let inactive = ctx.carts.add_item(cart.uuid, product.uuid, 1).await;

        assert!(
            matches!(inactive, Err(CartsServiceError::ProductNotFound { .. })),
            "expected ProductNotFound for inactive product, got {inactive:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_to_unknown_cart_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await;

        let result = ctx.carts.add_item(CartUuid::new(), product.uuid, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_does_not_touch_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;

        ctx.carts.add_item(cart.uuid, product.uuid, 4).await?;

        assert_eq!(ctx.stock_of(product.uuid).await, 5);

        Ok(())
    }

    #[tokio::test]
    async fn cart_scenario_respects_live_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(10_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;

        let cart = ctx.carts.add_item(cart.uuid, product.uuid, 3).await?;

        assert_eq!(cart.subtotal, 30_00);

        let result = ctx.carts.add_item(cart.uuid, product.uuid, 3).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InsufficientStock { available: 5, .. })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        let unchanged = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(unchanged.total_items, 3);
        assert_eq!(unchanged.subtotal, 30_00);

        let item = cart_line(&unchanged, product.uuid).map(|item| item.uuid);
        let item = item.ok_or("cart line missing")?;

        let cart = ctx.carts.update_item(cart.uuid, item, 2).await?;

        assert_eq!(cart.subtotal, 20_00);

        Ok(())
    }

    #[tokio::test]
    async fn update_item_beyond_stock_fails() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 2).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;
        let cart = ctx.carts.add_item(cart.uuid, product.uuid, 1).await?;
        let item = cart.items.first().map(|item| item.uuid).ok_or("no line")?;

        let result = ctx.carts.update_item(cart.uuid, item, 3).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InsufficientStock { available: 2, .. })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_item_non_positive_quantity_removes_line() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 2).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;
        let cart = ctx.carts.add_item(cart.uuid, product.uuid, 2).await?;
        let item = cart.items.first().map(|item| item.uuid).ok_or("no line")?;

        let cart = ctx.carts.update_item(cart.uuid, item, -1).await?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn update_item_in_other_cart_returns_item_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 2).await;

        let mine = ctx.carts.get_or_create_cart(&session()).await?;
        let theirs = ctx.carts.get_or_create_cart(&session()).await?;
        let theirs = ctx.carts.add_item(theirs.uuid, product.uuid, 1).await?;
        let item = theirs.items.first().map(|item| item.uuid).ok_or("no line")?;

        let result = ctx.carts.update_item(mine.uuid, item, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::ItemNotFound)),
            "expected ItemNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_twice_returns_item_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 2).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;
        let cart = ctx.carts.add_item(cart.uuid, product.uuid, 1).await?;
        let item = cart.items.first().map(|item| item.uuid).ok_or("no line")?;

        let cart = ctx.carts.remove_item(cart.uuid, item).await?;

        assert!(cart.is_empty());

        let result = ctx.carts.remove_item(cart.uuid, item).await;

        assert!(
            matches!(result, Err(CartsServiceError::ItemNotFound)),
            "expected ItemNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn clear_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(1_00, 2).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;
        ctx.carts.add_item(cart.uuid, product.uuid, 2).await?;

        let cleared = ctx.carts.clear(cart.uuid).await?;

        assert!(cleared.is_empty());

        let again = ctx.carts.clear(cart.uuid).await?;

        assert!(again.is_empty());
        assert_eq!(again.subtotal, 0);

        Ok(())
    }

    #[tokio::test]
    async fn cart_totals_follow_live_price() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(10_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;
        ctx.carts.add_item(cart.uuid, product.uuid, 2).await?;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    title: product.title.clone(),
                    author: product.author.clone(),
                    isbn: None,
                    price: 12_00,
                    is_active: true,
                },
            )
            .await?;

        let cart = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(cart.subtotal, 24_00);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_disappears_from_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(10_00, 5).await;
        let cart = ctx.carts.get_or_create_cart(&session()).await?;
        ctx.carts.add_item(cart.uuid, product.uuid, 2).await?;

        ctx.products.delete_product(product.uuid).await?;

        let cart = ctx.carts.get_cart(cart.uuid).await?;

        assert!(cart.is_empty());

        Ok(())
    }
}
