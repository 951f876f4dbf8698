//! Integration tests for Pocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Carts surviving a reload through the JSON file store
//! - `cart_scenarios` - End-to-end operation sequences and invariants
//!
//! Shared fixtures live here so each test file stays focused on behavior.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;

use pocket_cart::{CartConfig, CartStore, JsonFileStorage};
use pocket_cart_core::{Price, ProductDescriptor};

/// A shirt priced at 10.00.
#[must_use]
pub fn shirt() -> ProductDescriptor {
    ProductDescriptor::new("A", "Shirt", "u", Price::from_cents(1000))
}

/// A hat priced at 5.50.
#[must_use]
pub fn hat() -> ProductDescriptor {
    ProductDescriptor::new("B", "Hat", "v", Price::from_cents(550))
}

/// Configuration pointing the file store at `dir`.
#[must_use]
pub fn config_in(dir: &Path) -> CartConfig {
    CartConfig {
        data_dir: dir.to_path_buf(),
        ..CartConfig::default()
    }
}

/// Load a cart backed by JSON files under `dir`.
pub async fn open_file_cart(dir: &Path) -> CartStore {
    let config = config_in(dir);
    let storage = JsonFileStorage::new(&config.data_dir);
    CartStore::load(Arc::new(storage), &config).await
}
