use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, Version};
use domain::Cart;

use crate::Result;

/// Core trait for cart repository implementations.
///
/// A cart store persists whole carts — lines, total, timestamps, and
/// abandonment flag — as one unit. All implementations must be thread-safe
/// (Send + Sync) and must make `update` a compare-and-set on the cart's
/// version: that per-cart discipline is what serializes concurrent add/remove
/// operations and keeps the sweeper from racing destructively with in-flight
/// mutations.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Inserts a freshly created cart.
    async fn create(&self, cart: &Cart) -> Result<()>;

    /// Retrieves a cart by id.
    ///
    /// Returns None if no such cart exists.
    async fn get(&self, id: CartId) -> Result<Option<Cart>>;

    /// Persists a mutated cart.
    ///
    /// The stored version must equal `cart.version()`; the cart is written
    /// with the next version, which is returned. Fails with
    /// `ConcurrencyConflict` when another writer got there first, and with
    /// `CartNotFound` when the cart has been destroyed in the meantime.
    async fn update(&self, cart: &Cart) -> Result<Version>;

    /// Destroys a cart and all of its lines as one atomic batch.
    ///
    /// Fails with `CartNotFound` if the cart does not exist.
    async fn destroy(&self, id: CartId) -> Result<()>;

    /// Returns the non-abandoned carts whose last interaction predates
    /// `cutoff` — the mark-pass candidates.
    async fn find_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>>;

    /// Returns the abandoned carts whose last write predates `cutoff` —
    /// the remove-pass candidates.
    async fn find_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>>;
}

/// Extension trait providing convenience methods for cart stores.
#[async_trait]
pub trait CartStoreExt: CartStore {
    /// Reconciles a client session's cart reference with server-side state.
    ///
    /// Returns the referenced cart only if it exists and is not abandoned;
    /// in every other case (no reference, unknown id, abandoned cart) a fresh
    /// empty cart is created, persisted, and returned. An abandoned cart is
    /// never handed back, even when the session still references it.
    async fn find_or_create_for_session(
        &self,
        session_cart_id: Option<CartId>,
        now: DateTime<Utc>,
    ) -> Result<Cart> {
        if let Some(id) = session_cart_id
            && let Some(cart) = self.get(id).await?
            && !cart.is_abandoned()
        {
            return Ok(cart);
        }

        let cart = Cart::new(CartId::new(), now);
        self.create(&cart).await?;
        Ok(cart)
    }

    /// Checks whether a cart exists.
    async fn cart_exists(&self, id: CartId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

// Blanket implementation for all CartStore implementations
impl<T: CartStore + ?Sized> CartStoreExt for T {}
