//! Product descriptors and cart line items.
//!
//! A [`ProductDescriptor`] is what the UI knows about a product before it is
//! in the cart. A [`LineItem`] is a descriptor that has been given a quantity
//! by the cart. Keeping them as separate types means a caller can never hand
//! the cart a quantity of its own choosing.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as offered to the cart, without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Merge key.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl ProductDescriptor {
    /// Create a new product descriptor.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// One distinct product in the cart.
///
/// The quantity is always at least one. Decrementing an item with quantity
/// one consumes it and yields `None`, so a zero-quantity item cannot exist.
///
/// ```
/// use pocket_cart_core::{LineItem, Price, ProductDescriptor};
///
/// let shirt = ProductDescriptor::new("A", "Shirt", "u", Price::from_cents(1000));
/// let mut item = LineItem::new(shirt);
/// item.increment();
/// assert_eq!(item.quantity().get(), 2);
///
/// let item = item.decrement().unwrap();
/// assert!(item.decrement().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    product: ProductDescriptor,
    quantity: NonZeroU32,
}

impl LineItem {
    /// Create a line item with quantity one.
    #[must_use]
    pub const fn new(product: ProductDescriptor) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Create a line item with an explicit quantity.
    #[must_use]
    pub const fn with_quantity(product: ProductDescriptor, quantity: NonZeroU32) -> Self {
        Self { product, quantity }
    }

    /// Returns the product identifier.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.product.title
    }

    /// Returns the display image reference.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.product.image_url
    }

    /// Returns the unit price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.product.price
    }

    /// Returns the quantity.
    #[must_use]
    pub const fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    /// Add one unit. Saturates at `u32::MAX`.
    pub const fn increment(&mut self) {
        self.increment_by(1);
    }

    /// Add `units` units. Saturates at `u32::MAX`.
    pub const fn increment_by(&mut self, units: u32) {
        self.quantity = self.quantity.saturating_add(units);
    }

    /// Remove one unit, consuming the item when the last unit goes.
    #[must_use]
    pub fn decrement(self) -> Option<Self> {
        NonZeroU32::new(self.quantity.get() - 1).map(|quantity| Self {
            product: self.product,
            quantity,
        })
    }

    /// Replace title, image and price with those of `product`.
    ///
    /// The id is left alone; callers only pass descriptors with a matching id.
    pub fn refresh_details(&mut self, product: ProductDescriptor) {
        debug_assert_eq!(self.product.id, product.id);
        self.product.title = product.title;
        self.product.image_url = product.image_url;
        self.product.price = product.price;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shirt() -> ProductDescriptor {
        ProductDescriptor::new("A", "Shirt", "https://cdn.example/a.png", Price::from_cents(1000))
    }

    #[test]
    fn test_new_line_item_has_quantity_one() {
        let item = LineItem::new(shirt());
        assert_eq!(item.quantity().get(), 1);
        assert_eq!(item.id().as_str(), "A");
    }

    #[test]
    fn test_increment_saturates() {
        let mut item = LineItem::with_quantity(shirt(), NonZeroU32::MAX);
        item.increment();
        assert_eq!(item.quantity(), NonZeroU32::MAX);
    }

    #[test]
    fn test_decrement_from_two_keeps_item() {
        let item = LineItem::with_quantity(shirt(), NonZeroU32::new(2).unwrap());
        let item = item.decrement().unwrap();
        assert_eq!(item.quantity().get(), 1);
    }

    #[test]
    fn test_decrement_from_one_removes_item() {
        assert!(LineItem::new(shirt()).decrement().is_none());
    }

    #[test]
    fn test_refresh_details_keeps_quantity() {
        let mut item = LineItem::with_quantity(shirt(), NonZeroU32::new(3).unwrap());
        item.refresh_details(ProductDescriptor::new(
            "A",
            "Shirt (new)",
            "https://cdn.example/a2.png",
            Price::from_cents(800),
        ));
        assert_eq!(item.title(), "Shirt (new)");
        assert_eq!(item.price(), Price::from_cents(800));
        assert_eq!(item.quantity().get(), 3);
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let value = serde_json::to_value(LineItem::new(shirt())).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "A",
                "title": "Shirt",
                "image_url": "https://cdn.example/a.png",
                "price": "10.00",
                "quantity": 1,
            })
        );
    }

    #[test]
    fn test_descriptor_accepts_camel_case_image_url() {
        let product: ProductDescriptor = serde_json::from_str(
            r#"{"id":"A","title":"Shirt","imageUrl":"u","price":10}"#,
        )
        .unwrap();
        assert_eq!(product.image_url, "u");
    }
}
