use common::ProductId;
use serde::{Deserialize, Serialize};

use super::Money;

/// One product line within a cart.
///
/// A cart holds at most one line per product; repeated adds merge into the
/// existing line's quantity. The unit price is deliberately absent: it is
/// resolved from the catalog at read time, so lines always price at the
/// product's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Quantity in the cart, always positive.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a new cart line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Returns the line total at the given unit price.
    pub fn line_total(&self, unit_price: Money) -> Money {
        unit_price.multiply(self.quantity)
    }
}
