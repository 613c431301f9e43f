use common::{CartId, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the cart store.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// A concurrency conflict occurred when updating a cart.
    /// The expected version did not match the stored version.
    #[error("Concurrency conflict for cart {cart_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        cart_id: CartId,
        expected: Version,
        actual: Version,
    },

    /// The cart was not found in the store.
    #[error("Cart not found: {0}")]
    CartNotFound(CartId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cart store operations.
pub type Result<T> = std::result::Result<T, CartStoreError>;
