use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, Version};
use domain::Cart;
use tokio::sync::RwLock;

use crate::{CartStore, CartStoreError, Result};

/// In-memory cart store implementation.
///
/// Stores all carts in a process-local map behind a write lock, providing
/// the same interface and versioning semantics as the PostgreSQL
/// implementation. Used by tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CartId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of carts stored.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Clears all carts.
    pub async fn clear(&self) {
        self.carts.write().await.clear();
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn create(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.id(), cart.clone());
        Ok(())
    }

    async fn get(&self, id: CartId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&id).cloned())
    }

    async fn update(&self, cart: &Cart) -> Result<Version> {
        let mut carts = self.carts.write().await;

        let stored = carts
            .get(&cart.id())
            .ok_or(CartStoreError::CartNotFound(cart.id()))?;

        if stored.version() != cart.version() {
            return Err(CartStoreError::ConcurrencyConflict {
                cart_id: cart.id(),
                expected: cart.version(),
                actual: stored.version(),
            });
        }

        let next = cart.version().next();
        let mut updated = cart.clone();
        updated.set_version(next);
        carts.insert(cart.id(), updated);

        Ok(next)
    }

    async fn destroy(&self, id: CartId) -> Result<()> {
        // Lines live inside the cart value, so removing the entry is the
        // whole cascade.
        self.carts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(CartStoreError::CartNotFound(id))
    }

    async fn find_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts
            .values()
            .filter(|c| !c.is_abandoned() && c.last_interaction_at() < cutoff)
            .cloned()
            .collect())
    }

    async fn find_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts
            .values()
            .filter(|c| c.is_abandoned() && c.updated_at() < cutoff)
            .cloned()
            .collect())
    }
}
