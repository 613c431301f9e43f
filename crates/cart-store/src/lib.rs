//! Cart repository implementations.
//!
//! The [`CartStore`] trait is the storage contract for carts: lookup,
//! creation, versioned update, cascading destroy, and the two sweep queries
//! the abandonment job runs on. [`InMemoryCartStore`] backs tests and
//! single-process deployments; [`PostgresCartStore`] persists to PostgreSQL.

mod error;
mod memory;
mod postgres;
mod store;

pub use error::{CartStoreError, Result};
pub use memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;
pub use store::{CartStore, CartStoreExt};
