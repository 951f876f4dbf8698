//! Pocket Cart Core - Shared cart types.
//!
//! This crate provides the types shared by every Pocket Cart component:
//! - `pocket-cart` - Cart store, persistence adapters and configuration
//! - `pocket-cart-cli` - Command-line front end over the file-backed store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices, product descriptors and line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
