//! Cart aggregate and related types.

mod aggregate;
mod item;
mod value_objects;
mod view;

pub use aggregate::{Cart, abandonment_window, removal_window};
pub use item::CartItem;
pub use value_objects::{Money, Pricing, Product, validate_quantity};
pub use view::{CartLineView, CartView};

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantity is not a positive integer.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },

    /// Product not present in the cart.
    #[error("Product not in cart: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// A cart line references a product the pricing map cannot resolve.
    #[error("No price available for product: {product_id}")]
    UnpricedItem { product_id: ProductId },
}
