//! The cart aggregate.
//!
//! Lifecycle:
//! ```text
//! Active ──(no interaction ≥ 3h)──► Abandoned ──(abandoned ≥ 7d)──► Destroyed
//! ```
//! The transitions are one-directional. The Active→Abandoned edge is clocked
//! by `last_interaction_at`; the Abandoned→Destroyed edge by `updated_at`,
//! which `mark_abandoned` resets when the abandoned state is entered.

use chrono::{DateTime, Duration, Utc};
use common::{CartId, ProductId, Version};
use serde::{Deserialize, Serialize};

use super::{CartError, CartItem, Money, Pricing, Product};

/// How long a cart may go without interaction before it can be marked
/// abandoned.
pub fn abandonment_window() -> Duration {
    Duration::hours(3)
}

/// How long a cart must have been abandoned before it can be removed.
pub fn removal_window() -> Duration {
    Duration::days(7)
}

/// An anonymous, session-scoped shopping cart.
///
/// The aggregate owns its item lines exclusively; destroying a cart destroys
/// every line with it. All clock inputs are explicit so the time-based
/// transitions can be tested to the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    items: Vec<CartItem>,
    total_price: Money,
    last_interaction_at: DateTime<Utc>,
    abandoned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: Version,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new(id: CartId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            items: Vec::new(),
            total_price: Money::zero(),
            last_interaction_at: now,
            abandoned: false,
            created_at: now,
            updated_at: now,
            version: Version::initial(),
        }
    }

    /// Reassembles a cart from persisted state. For storage backends.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: CartId,
        items: Vec<CartItem>,
        total_price: Money,
        last_interaction_at: DateTime<Utc>,
        abandoned: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: Version,
    ) -> Self {
        Self {
            id,
            items,
            total_price,
            last_interaction_at,
            abandoned,
            created_at,
            updated_at,
            version,
        }
    }

    /// The cart's identifier.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Iterates over the cart's lines in insertion order.
    pub fn items(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct product lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the line for a product, if present.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// The cart's grand total as of the last recompute.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Timestamp of the last add/remove interaction.
    pub fn last_interaction_at(&self) -> DateTime<Utc> {
        self.last_interaction_at
    }

    /// Returns true once the cart has been marked abandoned.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last mutation; the removal clock once abandoned.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Current persistence version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Overwrites the persistence version. For storage backends.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Adds a product to the cart.
    ///
    /// If a line for the product already exists its quantity increases by
    /// `quantity` (merge semantics, never replace); otherwise a new line is
    /// appended. On success the interaction time is touched and the total is
    /// recomputed from `pricing`.
    ///
    /// Callers validate quantities at the boundary; a zero here is rejected
    /// with [`CartError::InvalidQuantity`] as a safety net.
    pub fn add_product(
        &mut self,
        product: &Product,
        quantity: u32,
        pricing: &Pricing,
        now: DateTime<Utc>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity: 0 });
        }

        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem::new(product.id.clone(), quantity)),
        }

        self.touch_interaction(now);
        self.updated_at = now;
        self.recompute_total(pricing)
    }

    /// Removes a product's line from the cart.
    ///
    /// Returns [`CartError::ItemNotFound`] without mutating anything if the
    /// product has no line. On success the interaction time is touched and
    /// the total recomputed.
    pub fn remove_product(
        &mut self,
        product_id: &ProductId,
        pricing: &Pricing,
        now: DateTime<Utc>,
    ) -> Result<(), CartError> {
        let position = self
            .items
            .iter()
            .position(|item| &item.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound {
                product_id: product_id.clone(),
            })?;

        self.items.remove(position);
        self.touch_interaction(now);
        self.updated_at = now;
        self.recompute_total(pricing)
    }

    /// Recomputes the grand total as a fold over the current lines.
    ///
    /// Restores the invariant `total_price == Σ line totals`; must run after
    /// any item-set change.
    pub fn recompute_total(&mut self, pricing: &Pricing) -> Result<(), CartError> {
        let mut total = Money::zero();
        for item in &self.items {
            let unit_price =
                pricing
                    .price_of(&item.product_id)
                    .ok_or_else(|| CartError::UnpricedItem {
                        product_id: item.product_id.clone(),
                    })?;
            total += item.line_total(unit_price);
        }
        self.total_price = total;
        Ok(())
    }

    /// Sets `last_interaction_at`, restarting the abandonment clock.
    pub fn touch_interaction(&mut self, now: DateTime<Utc>) {
        self.last_interaction_at = now;
    }

    /// Attempts the Active → Abandoned transition.
    ///
    /// Succeeds only when the cart is not already abandoned and has seen no
    /// interaction for at least the abandonment window. On success
    /// `updated_at` is set to `now`, restarting the clock for the removal
    /// window. Returns whether the transition happened.
    pub fn mark_abandoned(&mut self, now: DateTime<Utc>) -> bool {
        if self.abandoned {
            return false;
        }
        if !self.inactive_for(abandonment_window(), now) {
            return false;
        }

        self.abandoned = true;
        self.updated_at = now;
        true
    }

    /// Returns true when the Abandoned → Destroyed transition may run:
    /// the cart is abandoned and has been so for at least the removal
    /// window. The destruction itself is the repository's cascading
    /// `destroy`.
    pub fn eligible_for_removal(&self, now: DateTime<Utc>) -> bool {
        self.abandoned && self.abandoned_for(removal_window(), now)
    }

    fn inactive_for(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_interaction_at) >= window
    }

    fn abandoned_for(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.updated_at) >= window
    }
}
