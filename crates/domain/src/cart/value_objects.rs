//! Value objects for the cart domain.

use std::collections::HashMap;

use common::ProductId;
use serde::{Deserialize, Serialize};

use super::CartError;

/// Money amount represented in cents to keep cart totals exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole dollar value.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity, producing a line total.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * i64::from(quantity),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A product as resolved from the external catalog.
///
/// The cart never owns products; it holds one of these only for the duration
/// of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Current unit price.
    pub price: Money,
}

impl Product {
    /// Creates a new product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// A resolved `ProductId → unit price` map.
///
/// Unit prices are not stored on cart lines; callers resolve current catalog
/// prices into a `Pricing` before invoking a cart mutation, which keeps
/// total recomputation a pure fold and makes price changes take effect on the
/// next recompute.
#[derive(Debug, Clone, Default)]
pub struct Pricing {
    prices: HashMap<ProductId, Money>,
}

impl Pricing {
    /// Creates an empty pricing map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pricing map from resolved products.
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let prices = products
            .into_iter()
            .map(|p| (p.id.clone(), p.price))
            .collect();
        Self { prices }
    }

    /// Adds or replaces a price, builder-style.
    pub fn with_price(mut self, product_id: impl Into<ProductId>, price: Money) -> Self {
        self.prices.insert(product_id.into(), price);
        self
    }

    /// Returns the unit price for a product, if resolved.
    pub fn price_of(&self, product_id: &ProductId) -> Option<Money> {
        self.prices.get(product_id).copied()
    }
}

/// Validates a raw quantity from the outside world.
///
/// Quantities must be positive integers; this is the boundary check the
/// transport layer runs before any mutation is attempted.
pub fn validate_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidQuantity { quantity });
    }
    u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity { quantity })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
    }

    #[test]
    fn money_from_dollars() {
        assert_eq!(Money::from_dollars(50).cents(), 5000);
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn money_multiply_by_quantity() {
        assert_eq!(Money::from_cents(1000).multiply(3).cents(), 3000);
        assert_eq!(Money::from_cents(1550).multiply(3).cents(), 4650);
    }

    #[test]
    fn money_sums_exactly() {
        let total: Money = [10, 20, 70].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 100);
    }

    #[test]
    fn money_add_assign() {
        let mut money = Money::from_cents(100);
        money += Money::from_cents(50);
        assert_eq!(money.cents(), 150);
    }

    #[test]
    fn zero_money_is_zero() {
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(1).is_zero());
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn pricing_resolves_known_products() {
        let widget = Product::new("SKU-001", "Widget", Money::from_cents(1000));
        let gadget = Product::new("SKU-002", "Gadget", Money::from_cents(500));
        let pricing = Pricing::from_products([&widget, &gadget]);

        assert_eq!(
            pricing.price_of(&ProductId::new("SKU-001")),
            Some(Money::from_cents(1000))
        );
        assert_eq!(pricing.price_of(&ProductId::new("SKU-404")), None);
    }

    #[test]
    fn pricing_with_price_replaces() {
        let pricing = Pricing::new()
            .with_price("SKU-001", Money::from_cents(1000))
            .with_price("SKU-001", Money::from_cents(2000));
        assert_eq!(
            pricing.price_of(&ProductId::new("SKU-001")),
            Some(Money::from_cents(2000))
        );
    }

    #[test]
    fn validate_quantity_accepts_positive() {
        assert_eq!(validate_quantity(1), Ok(1));
        assert_eq!(validate_quantity(42), Ok(42));
    }

    #[test]
    fn validate_quantity_rejects_zero_and_negative() {
        assert_eq!(
            validate_quantity(0),
            Err(CartError::InvalidQuantity { quantity: 0 })
        );
        assert_eq!(
            validate_quantity(-3),
            Err(CartError::InvalidQuantity { quantity: -3 })
        );
    }

    #[test]
    fn validate_quantity_rejects_overflow() {
        let too_big = i64::from(u32::MAX) + 1;
        assert_eq!(
            validate_quantity(too_big),
            Err(CartError::InvalidQuantity { quantity: too_big })
        );
    }

    #[test]
    fn product_serialization_roundtrip() {
        let product = Product::new("SKU-001", "Widget", Money::from_cents(999));
        let json = serde_json::to_string(&product).unwrap();
        let deserialized: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product, deserialized);
    }
}
