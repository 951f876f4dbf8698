//! Cart commands over the JSON file store.
//!
//! Every command loads the cart, applies at most one change, and waits for
//! the snapshot writer before returning so the file is current on exit.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use pocket_cart::{CartConfig, CartError, CartStore, JsonFileStorage, LineItem};
use pocket_cart_core::{Price, ProductDescriptor, ProductId};
use tracing::info;

/// Load the cart named by configuration, with optional overrides.
///
/// # Errors
///
/// Returns `CartError::Config` if the environment holds invalid settings.
pub async fn open(data_dir: Option<PathBuf>, key: Option<String>) -> Result<CartStore, CartError> {
    let mut config = CartConfig::from_env()?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(key) = key {
        config.storage_key = key;
    }

    let storage = JsonFileStorage::new(&config.data_dir);
    // Surface a bad key here rather than as a logged write failure later
    storage.path_for(&config.storage_key)?;

    info!(
        dir = %config.data_dir.display(),
        key = %config.storage_key,
        merge_policy = %config.merge_policy,
        "Opening cart"
    );
    Ok(CartStore::load(Arc::new(storage), &config).await)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `CartError::WriterStopped` if the snapshot could not be flushed.
pub async fn add(
    store: &CartStore,
    id: ProductId,
    title: String,
    image_url: String,
    price: Price,
) -> Result<(), CartError> {
    info!(product_id = %id, "Adding to cart");
    store.add_to_cart(ProductDescriptor {
        id,
        title,
        image_url,
        price,
    });
    store.flush().await
}

/// Add one unit of a product already in the cart.
///
/// # Errors
///
/// Returns `CartError::WriterStopped` if the snapshot could not be flushed.
pub async fn increment(store: &CartStore, id: &ProductId) -> Result<(), CartError> {
    store.increment(id);
    store.flush().await
}

/// Remove one unit of a product.
///
/// # Errors
///
/// Returns `CartError::WriterStopped` if the snapshot could not be flushed.
pub async fn decrement(store: &CartStore, id: &ProductId) -> Result<(), CartError> {
    store.decrement(id);
    store.flush().await
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CartError::WriterStopped` if the snapshot could not be flushed.
pub async fn clear(store: &CartStore) -> Result<(), CartError> {
    store.clear();
    store.flush().await
}

/// Print the cart to stdout.
pub fn print(store: &CartStore) {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&store.items()));
    }
}

/// Format line items as a plain-text table.
fn render(items: &[LineItem]) -> String {
    if items.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let id_width = items
        .iter()
        .map(|item| item.id().as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let mut total: u64 = 0;
    for item in items {
        total += u64::from(item.quantity().get());
        let _ = writeln!(
            out,
            "{:>5} x {:<id_width$}  {}  @ {}",
            item.quantity(),
            item.id(),
            item.title(),
            item.price(),
        );
    }
    let _ = writeln!(out, "{} product(s), {total} unit(s)", items.len());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use pocket_cart::MemoryStorage;

    use super::*;

    async fn memory_cart() -> CartStore {
        CartStore::load(Arc::new(MemoryStorage::new()), &CartConfig::default()).await
    }

    #[tokio::test]
    async fn test_increment_and_decrement_unknown_id_leave_cart_alone() {
        let store = memory_cart().await;
        add(&store, ProductId::new("A"), "Shirt".into(), "u".into(), Price::from_cents(1000))
            .await
            .unwrap();
        let before = store.items();

        increment(&store, &ProductId::new("missing")).await.unwrap();
        decrement(&store, &ProductId::new("missing")).await.unwrap();

        assert_eq!(store.items(), before);
    }

    #[tokio::test]
    async fn test_decrement_command_removes_last_unit() {
        let store = memory_cart().await;
        add(&store, ProductId::new("A"), "Shirt".into(), "u".into(), Price::from_cents(1000))
            .await
            .unwrap();
        increment(&store, &ProductId::new("A")).await.unwrap();
        assert_eq!(store.total_quantity(), 2);

        decrement(&store, &ProductId::new("A")).await.unwrap();
        decrement(&store, &ProductId::new("A")).await.unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "Cart is empty\n");
    }

    #[test]
    fn test_render_items() {
        let items = vec![
            LineItem::with_quantity(
                ProductDescriptor::new("A", "Shirt", "u", Price::from_cents(1999)),
                NonZeroU32::new(2).unwrap(),
            ),
            LineItem::new(ProductDescriptor::new(
                "sku-long",
                "Hat",
                "v",
                Price::from_cents(500),
            )),
        ];

        let out = render(&items);

        assert_eq!(
            out,
            "    2 x A         Shirt  @ 19.99\n    1 x sku-long  Hat  @ 5.00\n2 product(s), 3 unit(s)\n"
        );
    }
}
