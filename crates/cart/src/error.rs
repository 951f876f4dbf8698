//! Crate-level error type.
//!
//! Cart mutations never fail; errors come from setup (configuration, opening a
//! store), from reading the cart outside a provider, and from waiting on the
//! snapshot writer.

use thiserror::Error;

use crate::config::ConfigError;
use crate::context::ScopeError;
use crate::snapshot::SnapshotError;
use crate::storage::StorageError;

/// Error type for the cart crate.
#[derive(Debug, Error)]
pub enum CartError {
    /// Persistence adapter operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be encoded or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Cart used outside a provider.
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The background snapshot writer is gone.
    #[error("Cart snapshot writer has stopped")]
    WriterStopped,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
