//! The cart read model exposed to rendering layers.

use std::collections::HashMap;

use common::{CartId, ProductId};
use serde::{Deserialize, Serialize};

use super::{Cart, CartError, Product};

/// One rendered product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineView {
    /// The product identifier.
    pub id: ProductId,

    /// Product name as currently listed in the catalog.
    pub name: String,

    /// Quantity in the cart.
    pub quantity: u32,

    /// Current catalog unit price, in cents.
    pub unit_price_cents: i64,

    /// Line total at the current unit price, in cents.
    pub total_price_cents: i64,
}

/// The serialization contract for a cart: its id, one entry per product
/// line, and the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    /// The cart identifier. Callers carry this between requests in place of
    /// server-side session state.
    pub id: CartId,

    /// Product lines in insertion order.
    pub products: Vec<CartLineView>,

    /// Grand total as of the cart's last recompute, in cents.
    pub total_price_cents: i64,
}

impl CartView {
    /// Projects a cart and its resolved products into the read model.
    ///
    /// `products` must cover every line in the cart; a missing entry surfaces
    /// as [`CartError::UnpricedItem`].
    pub fn project(cart: &Cart, products: &HashMap<ProductId, Product>) -> Result<Self, CartError> {
        let mut lines = Vec::with_capacity(cart.item_count());
        for item in cart.items() {
            let product =
                products
                    .get(&item.product_id)
                    .ok_or_else(|| CartError::UnpricedItem {
                        product_id: item.product_id.clone(),
                    })?;
            lines.push(CartLineView {
                id: product.id.clone(),
                name: product.name.clone(),
                quantity: item.quantity,
                unit_price_cents: product.price.cents(),
                total_price_cents: item.line_total(product.price).cents(),
            });
        }

        Ok(Self {
            id: cart.id(),
            products: lines,
            total_price_cents: cart.total_price().cents(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Money, Pricing};
    use chrono::{TimeZone, Utc};

    fn resolved(products: &[Product]) -> HashMap<ProductId, Product> {
        products.iter().map(|p| (p.id.clone(), p.clone())).collect()
    }

    #[test]
    fn projects_lines_and_total() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let widget = Product::new("SKU-001", "Widget", Money::from_cents(1000));
        let pricing = Pricing::from_products([&widget]);

        let mut cart = Cart::new(CartId::new(), now);
        cart.add_product(&widget, 2, &pricing, now).unwrap();

        let view = CartView::project(&cart, &resolved(&[widget])).unwrap();

        assert_eq!(view.id, cart.id());
        assert_eq!(view.total_price_cents, 2000);
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].name, "Widget");
        assert_eq!(view.products[0].quantity, 2);
        assert_eq!(view.products[0].unit_price_cents, 1000);
        assert_eq!(view.products[0].total_price_cents, 2000);
    }

    #[test]
    fn empty_cart_projects_empty() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let cart = Cart::new(CartId::new(), now);

        let view = CartView::project(&cart, &HashMap::new()).unwrap();

        assert!(view.products.is_empty());
        assert_eq!(view.total_price_cents, 0);
    }

    #[test]
    fn missing_product_resolution_is_an_error() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let widget = Product::new("SKU-001", "Widget", Money::from_cents(1000));
        let pricing = Pricing::from_products([&widget]);

        let mut cart = Cart::new(CartId::new(), now);
        cart.add_product(&widget, 1, &pricing, now).unwrap();

        let err = CartView::project(&cart, &HashMap::new());
        assert_eq!(
            err,
            Err(CartError::UnpricedItem {
                product_id: widget.id
            })
        );
    }
}
