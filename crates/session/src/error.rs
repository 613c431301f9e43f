use cart_store::CartStoreError;
use common::CartId;
use domain::CartError;
use thiserror::Error;

use crate::CatalogError;

/// Errors that can occur during session cart operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A domain-level cart error (invalid quantity, item not in cart).
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The product catalog could not resolve a product.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The cart store failed.
    #[error("Cart store error: {0}")]
    Store(#[from] CartStoreError),

    /// An explicit by-id lookup found no cart. Session-referenced carts
    /// never surface this; they fall back to a fresh cart instead.
    #[error("Cart not found: {0}")]
    CartNotFound(CartId),
}
