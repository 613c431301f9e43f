//! Session-scoped cart operations.
//!
//! [`CartService`] is the application layer between a transport (HTTP, CLI,
//! tests) and the cart domain: it reconciles the caller's cart reference with
//! stored state, resolves live prices from the [`ProductCatalog`], runs the
//! domain mutation, and persists the result under the store's per-cart
//! versioning discipline.

mod catalog;
mod error;
mod service;

pub use catalog::{CatalogError, InMemoryProductCatalog, ProductCatalog};
pub use error::SessionError;
pub use service::CartService;
