//! Core types for Pocket Cart.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod id;
pub mod line_item;
pub mod price;

pub use id::{ProductId, ProductIdError};
pub use line_item::{LineItem, ProductDescriptor};
pub use price::{Price, PriceError};
