//! Provider scope for the cart.
//!
//! UI components receive a [`CartContext`] value from whoever builds the
//! component tree. A context either carries a loaded [`CartStore`] or is
//! empty; asking an empty context for the cart is a wiring bug and returns
//! [`ScopeError`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pocket_cart::{CartConfig, CartProvider, MemoryStorage, ProductId};
//!
//! # async fn demo() -> pocket_cart::Result<()> {
//! let context = CartProvider::new(Arc::new(MemoryStorage::new()), CartConfig::default())
//!     .mount()
//!     .await;
//!
//! let cart = context.use_cart()?;
//! cart.increment(&ProductId::new("sku-1"));
//! # Ok(()) }
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::config::CartConfig;
use crate::storage::KeyValueStore;
use crate::store::CartStore;

/// The cart was requested from a context that has no provider.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("use_cart must be used within a cart provider")]
pub struct ScopeError;

/// Builds a [`CartContext`] by loading a cart from storage.
pub struct CartProvider {
    storage: Arc<dyn KeyValueStore>,
    config: CartConfig,
}

impl CartProvider {
    /// Create a provider over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, config: CartConfig) -> Self {
        Self { storage, config }
    }

    /// Load the cart and return a context that provides it.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn mount(self) -> CartContext {
        let store = CartStore::load(self.storage, &self.config).await;
        CartContext::provide(store)
    }
}

/// A cart scope handed to UI components.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    store: Option<CartStore>,
}

impl CartContext {
    /// A context with no cart provider.
    #[must_use]
    pub const fn empty() -> Self {
        Self { store: None }
    }

    /// A context providing `store`.
    #[must_use]
    pub const fn provide(store: CartStore) -> Self {
        Self { store: Some(store) }
    }

    /// Returns the provided cart.
    ///
    /// # Errors
    ///
    /// Returns `ScopeError` if this context has no provider.
    pub fn use_cart(&self) -> Result<&CartStore, ScopeError> {
        self.store.as_ref().ok_or(ScopeError)
    }

    /// Returns `true` if a cart has been provided.
    #[must_use]
    pub const fn is_provided(&self) -> bool {
        self.store.is_some()
    }
}
