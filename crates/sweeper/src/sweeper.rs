use cart_store::{CartStore, Result};
use chrono::{DateTime, Utc};
use domain::{abandonment_window, removal_window};
use serde::Serialize;

/// Counts from one cleanup invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Carts newly marked abandoned.
    pub marked: usize,

    /// Abandoned carts removed.
    pub removed: usize,

    /// Carts skipped because their individual transition failed.
    pub failures: usize,
}

/// Applies the cart lifecycle transitions across all carts.
///
/// Each invocation runs two sequential passes — mark, then remove — against
/// one `now`. A cart marked in an invocation has its removal clock restarted
/// at that instant, so it can never also be removed in the same invocation.
/// Per-cart storage failures are logged and skipped; the surrounding pass
/// continues (the job is batch-oriented and re-runs shortly anyway).
pub struct AbandonmentSweeper<S> {
    store: S,
}

impl<S: CartStore> AbandonmentSweeper<S> {
    /// Creates a new sweeper over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Runs one cleanup invocation.
    ///
    /// Idempotent: a second immediate invocation finds no cart newly across
    /// either threshold and reports zero transitions. Safe to invoke
    /// concurrently-but-rarely; racing transitions degrade to logged skips
    /// under the store's versioning.
    #[tracing::instrument(skip(self))]
    pub async fn run_cleanup(&self) -> Result<CleanupReport> {
        let now = Utc::now();
        tracing::info!("starting abandoned cart cleanup");

        let mut report = CleanupReport::default();
        self.mark_pass(now, &mut report).await?;
        self.remove_pass(now, &mut report).await?;

        tracing::info!(
            marked = report.marked,
            removed = report.removed,
            failures = report.failures,
            "completed abandoned cart cleanup"
        );
        Ok(report)
    }

    /// Marks carts abandoned once inactive past the abandonment window.
    async fn mark_pass(&self, now: DateTime<Utc>, report: &mut CleanupReport) -> Result<()> {
        let cutoff = now - abandonment_window();
        let candidates = self.store.find_inactive_before(cutoff).await?;

        let mut marked = 0;
        for mut cart in candidates {
            if !cart.mark_abandoned(now) {
                continue;
            }
            match self.store.update(&cart).await {
                Ok(_) => {
                    marked += 1;
                    metrics::counter!("carts_marked_abandoned_total").increment(1);
                }
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!(cart_id = %cart.id(), error = %e, "failed to mark cart abandoned, skipping");
                }
            }
        }

        report.marked = marked;
        tracing::info!(count = marked, "marked carts as abandoned");
        Ok(())
    }

    /// Removes carts abandoned past the removal window.
    async fn remove_pass(&self, now: DateTime<Utc>, report: &mut CleanupReport) -> Result<()> {
        let cutoff = now - removal_window();
        let candidates = self.store.find_abandoned_before(cutoff).await?;

        let mut removed = 0;
        for cart in candidates {
            if !cart.eligible_for_removal(now) {
                continue;
            }
            match self.store.destroy(cart.id()).await {
                Ok(()) => {
                    removed += 1;
                    metrics::counter!("carts_removed_total").increment(1);
                }
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!(cart_id = %cart.id(), error = %e, "failed to remove abandoned cart, skipping");
                }
            }
        }

        report.removed = removed;
        tracing::info!(count = removed, "removed old abandoned carts");
        Ok(())
    }
}
