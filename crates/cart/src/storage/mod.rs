//! Key-value persistence adapters.
//!
//! The cart treats storage as a durable mirror of its in-memory state: it
//! reads one slot at startup and overwrites that slot after every change.
//! Any backend that can get and set strings by key will do.
//!
//! ## Provided backends
//! - [`MemoryStorage`]: in-process map (tests, disposable sessions).
//! - [`JsonFileStorage`]: one JSON file per key in a data directory.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

/// Errors returned by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
///
/// Implementations must be `Send + Sync`; the cart writes from a background
/// task while UI code may still hold the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}
