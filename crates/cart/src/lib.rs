//! Pocket Cart - persisted shopping cart store.
//!
//! This crate owns the in-memory cart and mirrors it to a key-value store
//! after every change. UI code talks to a [`CartStore`] handle, usually
//! reached through a [`CartContext`].
//!
//! # Modules
//!
//! - [`store`] - The cart store and its background snapshot writer
//! - [`context`] - Provider scope for handing the store to UI components
//! - [`storage`] - Key-value persistence adapters (memory, JSON files)
//! - [`snapshot`] - Snapshot encoding and load-time repair
//! - [`config`] - Configuration loaded from environment variables
//! - [`error`] - Crate-level error type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use config::{CartConfig, MergePolicy};
pub use context::{CartContext, CartProvider, ScopeError};
pub use error::{CartError, Result};
pub use storage::{JsonFileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use store::CartStore;

pub use pocket_cart_core::{LineItem, Price, ProductDescriptor, ProductId};
