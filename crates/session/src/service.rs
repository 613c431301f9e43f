//! The cart service: find-or-create, add, remove, render.

use std::collections::HashMap;

use cart_store::{CartStore, CartStoreError, CartStoreExt};
use chrono::Utc;
use common::{CartId, ProductId};
use domain::{Cart, CartView, Pricing, Product, validate_quantity};

use crate::{ProductCatalog, error::SessionError};

/// How many times a mutation is retried after losing a version race.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// High-level API for session cart operations.
///
/// Every mutation is a read-modify-write cycle: load (or create) the cart,
/// resolve current prices for its lines, apply the domain operation, and
/// persist under the store's compare-and-set. A lost race reloads and
/// retries, so two near-simultaneous adds to the same cart both land.
pub struct CartService<S, C> {
    store: S,
    catalog: C,
}

impl<S: CartStore, C: ProductCatalog> CartService<S, C> {
    /// Creates a new cart service over a store and a product catalog.
    pub fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves the session's cart, creating a fresh one when the reference
    /// is absent, unknown, or points at an abandoned cart.
    #[tracing::instrument(skip(self))]
    pub async fn current_cart(
        &self,
        session_cart_id: Option<CartId>,
    ) -> Result<CartView, SessionError> {
        let cart = self
            .store
            .find_or_create_for_session(session_cart_id, Utc::now())
            .await?;
        self.render(&cart).await
    }

    /// Looks up a cart by id.
    ///
    /// Unlike the session path this does not fall back to a fresh cart;
    /// unknown ids surface as [`SessionError::CartNotFound`].
    #[tracing::instrument(skip(self))]
    pub async fn cart(&self, id: CartId) -> Result<CartView, SessionError> {
        let cart = self
            .store
            .get(id)
            .await?
            .ok_or(SessionError::CartNotFound(id))?;
        self.render(&cart).await
    }

    /// Adds a quantity of a product to the session's cart.
    ///
    /// The product is resolved first (unknown products are a client error
    /// before any cart is touched), then the quantity is validated, and only
    /// then is the cart loaded and mutated.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        session_cart_id: Option<CartId>,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartView, SessionError> {
        let product = self.catalog.find_product(product_id).await?;
        let quantity = validate_quantity(quantity)?;
        let now = Utc::now();

        let mut attempts = 0;
        loop {
            let mut cart = self
                .store
                .find_or_create_for_session(session_cart_id, now)
                .await?;
            let products = self.resolve_products(&cart, Some(&product)).await?;
            let pricing = Pricing::from_products(products.values());

            cart.add_product(&product, quantity, &pricing, now)?;

            match self.store.update(&cart).await {
                Ok(_) => {
                    metrics::counter!("cart_items_added_total").increment(1);
                    return Ok(CartView::project(&cart, &products)?);
                }
                Err(CartStoreError::ConcurrencyConflict { .. })
                    if attempts + 1 < MAX_UPDATE_ATTEMPTS =>
                {
                    attempts += 1;
                    tracing::debug!(cart_id = %cart.id(), attempts, "cart update conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Removes a product's line from the session's cart.
    ///
    /// A product unknown to the catalog is reported as such; a known product
    /// that simply is not in the cart surfaces the distinct
    /// [`domain::CartError::ItemNotFound`].
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        session_cart_id: Option<CartId>,
        product_id: &ProductId,
    ) -> Result<CartView, SessionError> {
        self.catalog.find_product(product_id).await?;
        let now = Utc::now();

        let mut attempts = 0;
        loop {
            let mut cart = self
                .store
                .find_or_create_for_session(session_cart_id, now)
                .await?;
            let products = self.resolve_products(&cart, None).await?;
            let pricing = Pricing::from_products(products.values());

            cart.remove_product(product_id, &pricing, now)?;

            match self.store.update(&cart).await {
                Ok(_) => {
                    metrics::counter!("cart_items_removed_total").increment(1);
                    return Ok(CartView::project(&cart, &products)?);
                }
                Err(CartStoreError::ConcurrencyConflict { .. })
                    if attempts + 1 < MAX_UPDATE_ATTEMPTS =>
                {
                    attempts += 1;
                    tracing::debug!(cart_id = %cart.id(), attempts, "cart update conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolves current catalog entries for every line in the cart, plus an
    /// optional product being added.
    async fn resolve_products(
        &self,
        cart: &Cart,
        extra: Option<&Product>,
    ) -> Result<HashMap<ProductId, Product>, SessionError> {
        let mut products = HashMap::with_capacity(cart.item_count() + 1);
        if let Some(product) = extra {
            products.insert(product.id.clone(), product.clone());
        }
        for item in cart.items() {
            if !products.contains_key(&item.product_id) {
                let product = self.catalog.find_product(&item.product_id).await?;
                products.insert(item.product_id.clone(), product);
            }
        }
        Ok(products)
    }

    async fn render(&self, cart: &Cart) -> Result<CartView, SessionError> {
        let products = self.resolve_products(cart, None).await?;
        Ok(CartView::project(cart, &products)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogError, InMemoryProductCatalog};
    use cart_store::InMemoryCartStore;
    use domain::{CartError, Money};

    fn service() -> CartService<InMemoryCartStore, InMemoryProductCatalog> {
        let catalog = InMemoryProductCatalog::new();
        catalog.upsert(Product::new("SKU-001", "Widget", Money::from_cents(1000)));
        catalog.upsert(Product::new("SKU-002", "Gadget", Money::from_cents(500)));
        CartService::new(InMemoryCartStore::new(), catalog)
    }

    fn widget_id() -> ProductId {
        ProductId::new("SKU-001")
    }

    fn gadget_id() -> ProductId {
        ProductId::new("SKU-002")
    }

    #[tokio::test]
    async fn current_cart_creates_an_empty_cart() {
        let service = service();

        let view = service.current_cart(None).await.unwrap();

        assert!(view.products.is_empty());
        assert_eq!(view.total_price_cents, 0);
        assert_eq!(service.store().cart_count().await, 1);
    }

    #[tokio::test]
    async fn current_cart_returns_the_referenced_cart() {
        let service = service();
        let created = service.add_item(None, &widget_id(), 2).await.unwrap();

        let view = service.current_cart(Some(created.id)).await.unwrap();

        assert_eq!(view.id, created.id);
        assert_eq!(view.total_price_cents, 2000);
        assert_eq!(service.store().cart_count().await, 1);
    }

    #[tokio::test]
    async fn add_item_prices_the_line() {
        let service = service();

        let view = service.add_item(None, &widget_id(), 2).await.unwrap();

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].name, "Widget");
        assert_eq!(view.products[0].quantity, 2);
        assert_eq!(view.products[0].unit_price_cents, 1000);
        assert_eq!(view.products[0].total_price_cents, 2000);
        assert_eq!(view.total_price_cents, 2000);
    }

    #[tokio::test]
    async fn repeated_add_merges_quantities() {
        let service = service();

        let first = service.add_item(None, &widget_id(), 2).await.unwrap();
        let second = service
            .add_item(Some(first.id), &widget_id(), 3)
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.products.len(), 1);
        assert_eq!(second.products[0].quantity, 5);
        assert_eq!(second.total_price_cents, 5000);
    }

    #[tokio::test]
    async fn add_sums_across_products() {
        let service = service();

        let first = service.add_item(None, &widget_id(), 2).await.unwrap();
        let view = service
            .add_item(Some(first.id), &gadget_id(), 4)
            .await
            .unwrap();

        assert_eq!(view.products.len(), 2);
        assert_eq!(view.total_price_cents, 2000 + 2000);
    }

    #[tokio::test]
    async fn add_unknown_product_creates_nothing() {
        let service = service();
        let missing = ProductId::new("SKU-404");

        let err = service.add_item(None, &missing, 1).await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Catalog(CatalogError::ProductNotFound(id)) if id == missing
        ));
        assert_eq!(service.store().cart_count().await, 0);
    }

    #[tokio::test]
    async fn add_rejects_non_positive_quantities() {
        let service = service();

        for quantity in [0, -1] {
            let err = service
                .add_item(None, &widget_id(), quantity)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                SessionError::Cart(CartError::InvalidQuantity { quantity: q }) if q == quantity
            ));
        }
        assert_eq!(service.store().cart_count().await, 0);
    }

    #[tokio::test]
    async fn stale_session_reference_gets_a_fresh_cart() {
        let service = service();
        let stale = CartId::new();

        let view = service.add_item(Some(stale), &widget_id(), 1).await.unwrap();

        assert_ne!(view.id, stale);
        assert_eq!(view.total_price_cents, 1000);
    }

    #[tokio::test]
    async fn remove_item_empties_the_cart() {
        let service = service();
        let created = service.add_item(None, &widget_id(), 2).await.unwrap();

        let view = service
            .remove_item(Some(created.id), &widget_id())
            .await
            .unwrap();

        assert!(view.products.is_empty());
        assert_eq!(view.total_price_cents, 0);
    }

    #[tokio::test]
    async fn remove_item_keeps_other_lines() {
        let service = service();
        let created = service.add_item(None, &widget_id(), 2).await.unwrap();
        service
            .add_item(Some(created.id), &gadget_id(), 1)
            .await
            .unwrap();

        let view = service
            .remove_item(Some(created.id), &widget_id())
            .await
            .unwrap();

        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].name, "Gadget");
        assert_eq!(view.total_price_cents, 500);
    }

    #[tokio::test]
    async fn remove_item_not_in_cart_mutates_nothing() {
        let service = service();
        let created = service.add_item(None, &widget_id(), 2).await.unwrap();

        let err = service
            .remove_item(Some(created.id), &gadget_id())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Cart(CartError::ItemNotFound { product_id }) if product_id == gadget_id()
        ));
        let view = service.current_cart(Some(created.id)).await.unwrap();
        assert_eq!(view.total_price_cents, 2000);
        assert_eq!(view.products.len(), 1);
    }

    #[tokio::test]
    async fn remove_unknown_product_is_a_catalog_error() {
        let service = service();
        let created = service.add_item(None, &widget_id(), 2).await.unwrap();
        let missing = ProductId::new("SKU-404");

        let err = service
            .remove_item(Some(created.id), &missing)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Catalog(CatalogError::ProductNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn cart_by_id_surfaces_not_found() {
        let service = service();
        let unknown = CartId::new();

        let err = service.cart(unknown).await.unwrap_err();

        assert!(matches!(err, SessionError::CartNotFound(id) if id == unknown));
        // The explicit lookup never falls back to creating a cart.
        assert_eq!(service.store().cart_count().await, 0);
    }

    #[tokio::test]
    async fn lines_price_live_while_total_reflects_last_recompute() {
        let service = service();
        let catalog = InMemoryProductCatalog::new();
        catalog.upsert(Product::new("SKU-001", "Widget", Money::from_cents(1000)));
        let service = CartService::new(service.store.clone(), catalog.clone());

        let created = service.add_item(None, &widget_id(), 2).await.unwrap();
        assert_eq!(created.total_price_cents, 2000);

        // Price change after the last mutation: lines reprice immediately,
        // the stored grand total catches up on the next recompute.
        catalog.upsert(Product::new("SKU-001", "Widget", Money::from_cents(1500)));

        let view = service.current_cart(Some(created.id)).await.unwrap();
        assert_eq!(view.products[0].unit_price_cents, 1500);
        assert_eq!(view.products[0].total_price_cents, 3000);
        assert_eq!(view.total_price_cents, 2000);

        let view = service
            .add_item(Some(created.id), &widget_id(), 1)
            .await
            .unwrap();
        assert_eq!(view.products[0].quantity, 3);
        assert_eq!(view.total_price_cents, 4500);
    }

    #[tokio::test]
    async fn concurrent_adds_both_land() {
        let service = service();
        let created = service.add_item(None, &widget_id(), 1).await.unwrap();

        let widget = widget_id();
        let (a, b) = tokio::join!(
            service.add_item(Some(created.id), &widget, 1),
            service.add_item(Some(created.id), &widget, 1),
        );
        a.unwrap();
        b.unwrap();

        let view = service.current_cart(Some(created.id)).await.unwrap();
        assert_eq!(view.products[0].quantity, 3);
        assert_eq!(view.total_price_cents, 3000);
    }
}
