//! Integration tests for the abandonment sweeper.

use async_trait::async_trait;
use cart_store::{CartStore, CartStoreError, InMemoryCartStore, Result};
use chrono::{DateTime, Duration, Utc};
use common::{CartId, Version};
use domain::Cart;
use sweeper::AbandonmentSweeper;

fn cart_idle_for(hours: i64) -> Cart {
    Cart::new(CartId::new(), Utc::now() - Duration::hours(hours))
}

fn cart_abandoned_for(days: i64) -> Cart {
    let mut cart = Cart::new(CartId::new(), Utc::now() - Duration::days(days + 1));
    assert!(cart.mark_abandoned(Utc::now() - Duration::days(days)));
    cart
}

#[tokio::test]
async fn marks_inactive_carts_and_leaves_active_ones() {
    let store = InMemoryCartStore::new();
    let active = cart_idle_for(1);
    let inactive = cart_idle_for(4);
    store.create(&active).await.unwrap();
    store.create(&inactive).await.unwrap();

    let report = AbandonmentSweeper::new(store.clone())
        .run_cleanup()
        .await
        .unwrap();

    assert_eq!(report.marked, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failures, 0);

    let active = store.get(active.id()).await.unwrap().unwrap();
    assert!(!active.is_abandoned());
    let inactive = store.get(inactive.id()).await.unwrap().unwrap();
    assert!(inactive.is_abandoned());
}

#[tokio::test]
async fn removes_old_abandoned_carts_and_keeps_recent_ones() {
    let store = InMemoryCartStore::new();
    let recently_abandoned = cart_abandoned_for(2);
    let old_abandoned = cart_abandoned_for(8);
    store.create(&recently_abandoned).await.unwrap();
    store.create(&old_abandoned).await.unwrap();

    let report = AbandonmentSweeper::new(store.clone())
        .run_cleanup()
        .await
        .unwrap();

    assert_eq!(report.marked, 0);
    assert_eq!(report.removed, 1);

    assert!(store.get(old_abandoned.id()).await.unwrap().is_none());
    assert!(
        store
            .get(recently_abandoned.id())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn a_cart_is_never_marked_and_removed_in_one_invocation() {
    let store = InMemoryCartStore::new();
    // Idle far past both windows, but never marked: the removal clock only
    // starts when the mark pass sets it.
    let long_idle = cart_idle_for(24 * 30);
    store.create(&long_idle).await.unwrap();

    let sweeper = AbandonmentSweeper::new(store.clone());
    let report = sweeper.run_cleanup().await.unwrap();

    assert_eq!(report.marked, 1);
    assert_eq!(report.removed, 0);
    let cart = store.get(long_idle.id()).await.unwrap().unwrap();
    assert!(cart.is_abandoned());
}

#[tokio::test]
async fn immediate_rerun_is_idempotent() {
    let store = InMemoryCartStore::new();
    store.create(&cart_idle_for(4)).await.unwrap();
    store.create(&cart_abandoned_for(8)).await.unwrap();

    let sweeper = AbandonmentSweeper::new(store.clone());
    let first = sweeper.run_cleanup().await.unwrap();
    assert_eq!(first.marked, 1);
    assert_eq!(first.removed, 1);

    let second = sweeper.run_cleanup().await.unwrap();
    assert_eq!(second.marked, 0);
    assert_eq!(second.removed, 0);
    assert_eq!(second.failures, 0);
}

#[tokio::test]
async fn empty_store_sweeps_cleanly() {
    let store = InMemoryCartStore::new();
    let report = AbandonmentSweeper::new(store).run_cleanup().await.unwrap();
    assert_eq!(report, sweeper::CleanupReport::default());
}

/// Store wrapper that fails destroys for one designated cart.
#[derive(Clone)]
struct FailingDestroyStore {
    inner: InMemoryCartStore,
    fail_for: CartId,
}

#[async_trait]
impl CartStore for FailingDestroyStore {
    async fn create(&self, cart: &Cart) -> Result<()> {
        self.inner.create(cart).await
    }

    async fn get(&self, id: CartId) -> Result<Option<Cart>> {
        self.inner.get(id).await
    }

    async fn update(&self, cart: &Cart) -> Result<Version> {
        self.inner.update(cart).await
    }

    async fn destroy(&self, id: CartId) -> Result<()> {
        if id == self.fail_for {
            return Err(CartStoreError::CartNotFound(id));
        }
        self.inner.destroy(id).await
    }

    async fn find_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>> {
        self.inner.find_inactive_before(cutoff).await
    }

    async fn find_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Cart>> {
        self.inner.find_abandoned_before(cutoff).await
    }
}

#[tokio::test]
async fn a_failing_cart_is_skipped_not_fatal() {
    let inner = InMemoryCartStore::new();
    let doomed = cart_abandoned_for(9);
    let removable = cart_abandoned_for(8);
    inner.create(&doomed).await.unwrap();
    inner.create(&removable).await.unwrap();

    let store = FailingDestroyStore {
        inner: inner.clone(),
        fail_for: doomed.id(),
    };

    let report = AbandonmentSweeper::new(store).run_cleanup().await.unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(report.failures, 1);
    assert!(inner.get(removable.id()).await.unwrap().is_none());
    assert!(inner.get(doomed.id()).await.unwrap().is_some());
}
