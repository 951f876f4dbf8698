//! The cart store.
//!
//! [`CartStore`] owns the ordered list of line items. Every mutation runs
//! under one mutex: it updates the list, encodes the updated list, and queues
//! that snapshot for the background writer before releasing the lock. Two
//! consequences follow:
//!
//! - concurrent mutations apply in the order they take the lock, each seeing
//!   the result of the previous one
//! - the writer receives snapshots in mutation order, and each snapshot is
//!   the state *after* its mutation
//!
//! The writer persists snapshots with [`KeyValueStore::set`]. Callers never
//! wait on it; when several snapshots queue up, only the newest is written.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pocket_cart_core::{LineItem, ProductDescriptor, ProductId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{CartConfig, MergePolicy};
use crate::error::CartError;
use crate::snapshot;
use crate::storage::KeyValueStore;

/// Handle to a loaded cart.
///
/// This struct is cheaply cloneable via `Arc`; every clone refers to the same
/// cart. The background writer stops once the last clone is dropped and its
/// queue has drained.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    items: Mutex<Vec<LineItem>>,
    merge_policy: MergePolicy,
    writer: mpsc::UnboundedSender<WriterCommand>,
}

enum WriterCommand {
    Persist(String),
    Flush(oneshot::Sender<()>),
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &*self.lock_items())
            .field("merge_policy", &self.inner.merge_policy)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from `storage` and start its snapshot writer.
    ///
    /// A missing, unreadable, or malformed snapshot yields an empty cart; the
    /// problem is logged and never returned.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(storage, config), fields(key = %config.storage_key))]
    pub async fn load(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        let items = match storage.get(&config.storage_key).await {
            Ok(Some(raw)) => snapshot::decode_or_empty(&raw),
            Ok(None) => {
                debug!("No saved cart, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved cart, starting empty");
                Vec::new()
            }
        };
        info!(count = items.len(), "Cart loaded");

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(storage, config.storage_key.clone(), rx));

        Self {
            inner: Arc::new(CartStoreInner {
                items: Mutex::new(items),
                merge_policy: config.merge_policy,
                writer: tx,
            }),
        }
    }

    /// Returns a copy of the current line items, in cart order.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.lock_items().clone()
    }

    /// Returns a copy of the line item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<LineItem> {
        self.lock_items().iter().find(|item| item.id() == id).cloned()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    /// Returns `true` if the cart holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lock_items()
            .iter()
            .map(|item| u64::from(item.quantity().get()))
            .sum()
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart gets its quantity bumped and, depending
    /// on the [`MergePolicy`], its details refreshed. A new product is
    /// appended with quantity one.
    pub fn add_to_cart(&self, product: ProductDescriptor) {
        let merge_policy = self.inner.merge_policy;
        self.mutate(|items| {
            if let Some(existing) = items.iter_mut().find(|item| item.id() == &product.id) {
                existing.increment();
                if merge_policy == MergePolicy::RefreshDetails {
                    existing.refresh_details(product);
                }
                debug!(
                    product_id = %existing.id(),
                    quantity = existing.quantity().get(),
                    "Incremented existing line item"
                );
            } else {
                debug!(product_id = %product.id, "Appended new line item");
                items.push(LineItem::new(product));
            }
        });
    }

    /// Add one unit of the product with `id`. Unknown ids are ignored.
    pub fn increment(&self, id: &ProductId) {
        self.mutate(|items| {
            match items.iter_mut().find(|item| item.id() == id) {
                Some(item) => {
                    item.increment();
                    debug!(product_id = %id, quantity = item.quantity().get(), "Incremented");
                }
                None => debug!(product_id = %id, "Increment ignored, product not in cart"),
            }
        });
    }

    /// Remove one unit of the product with `id`.
    ///
    /// The line item is removed when its last unit goes. Unknown ids are
    /// ignored.
    pub fn decrement(&self, id: &ProductId) {
        self.mutate(|items| {
            let Some(position) = items.iter().position(|item| item.id() == id) else {
                debug!(product_id = %id, "Decrement ignored, product not in cart");
                return;
            };

            let item = items.remove(position);
            match item.decrement() {
                Some(item) => {
                    debug!(product_id = %id, quantity = item.quantity().get(), "Decremented");
                    items.insert(position, item);
                }
                None => debug!(product_id = %id, "Removed line item"),
            }
        });
    }

    /// Remove every line item.
    pub fn clear(&self) {
        self.mutate(|items| {
            debug!(count = items.len(), "Cleared cart");
            items.clear();
        });
    }

    /// Wait until every snapshot queued before this call has been handed to
    /// storage.
    ///
    /// Write failures are logged by the writer and do not fail the flush.
    ///
    /// # Errors
    ///
    /// Returns `CartError::WriterStopped` if the writer task is gone, which
    /// only happens when the runtime is shutting down.
    pub async fn flush(&self) -> Result<(), CartError> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .writer
            .send(WriterCommand::Flush(tx))
            .map_err(|_| CartError::WriterStopped)?;
        rx.await.map_err(|_| CartError::WriterStopped)
    }

    /// Apply `update` to the items and queue the resulting snapshot.
    fn mutate<R>(&self, update: impl FnOnce(&mut Vec<LineItem>) -> R) -> R {
        let mut items = self.lock_items();
        let result = update(&mut *items);
        self.queue_snapshot(items.as_slice());
        result
    }

    /// Encode `items` and hand the snapshot to the writer.
    ///
    /// Called with the items lock held so snapshots queue in mutation order.
    fn queue_snapshot(&self, items: &[LineItem]) {
        let raw = match snapshot::encode(items) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        if self.inner.writer.send(WriterCommand::Persist(raw)).is_err() {
            error!("Cart snapshot writer has stopped, snapshot dropped");
        }
    }

    fn lock_items(&self) -> MutexGuard<'_, Vec<LineItem>> {
        // A panic mid-update cannot leave a zero quantity behind, so a
        // poisoned list is still valid.
        self.inner
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background task that persists queued snapshots.
///
/// Drains everything queued, writes only the newest snapshot, then releases
/// any flush waiters from that batch.
async fn run_writer(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
) {
    debug!(key = %key, "Cart snapshot writer started");

    while let Some(command) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut coalesced = 0_usize;

        let mut next = Some(command);
        while let Some(command) = next {
            match command {
                WriterCommand::Persist(raw) => {
                    if latest.replace(raw).is_some() {
                        coalesced += 1;
                    }
                }
                WriterCommand::Flush(waiter) => waiters.push(waiter),
            }
            next = rx.try_recv().ok();
        }

        if let Some(raw) = latest {
            if coalesced > 0 {
                debug!(coalesced, "Skipped superseded cart snapshots");
            }
            match storage.set(&key, raw).await {
                Ok(()) => debug!(key = %key, "Cart snapshot saved"),
                Err(e) => error!(key = %key, error = %e, "Failed to save cart snapshot"),
            }
        }

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    debug!(key = %key, "Cart snapshot writer stopped");
}
