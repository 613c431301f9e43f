//! Pure domain layer for the session cart system.
//!
//! Everything in this crate is synchronous and IO-free: clock inputs are
//! explicit [`chrono::DateTime`] parameters and prices arrive pre-resolved in
//! a [`Pricing`] map, so lifecycle transitions and total arithmetic are
//! exactly testable.

pub mod cart;

pub use cart::{
    Cart, CartError, CartItem, CartLineView, CartView, Money, Pricing, Product,
    abandonment_window, removal_window, validate_quantity,
};
