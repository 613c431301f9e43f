//! The abandonment sweeper.
//!
//! A batch job meant to run on a fixed cadence: one pass marks carts
//! abandoned after three idle hours, a second removes carts abandoned for
//! seven days. The job only exposes [`AbandonmentSweeper::run_cleanup`]; the
//! timing mechanism belongs to the caller ([`run_on_interval`] is provided
//! for deployments without an external scheduler).

mod schedule;
mod sweeper;

pub use schedule::run_on_interval;
pub use sweeper::{AbandonmentSweeper, CleanupReport};
