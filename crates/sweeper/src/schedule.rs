use std::time::Duration;

use cart_store::CartStore;
use tokio::time::MissedTickBehavior;

use crate::AbandonmentSweeper;

/// Runs the sweeper forever on a fixed period.
///
/// For deployments without an external scheduler: spawn this as a background
/// task next to the request-handling tier. Failed runs are logged and the
/// loop continues with the next tick.
pub async fn run_on_interval<S: CartStore>(sweeper: AbandonmentSweeper<S>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so a freshly booted process
    // does not sweep before serving.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = sweeper.run_cleanup().await {
            tracing::error!(error = %e, "cart cleanup run failed");
        }
    }
}
