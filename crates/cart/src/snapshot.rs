//! Cart snapshot encoding.
//!
//! A snapshot is a JSON array of line items:
//!
//! ```json
//! [{"id":"A","title":"Shirt","image_url":"u","price":"10.00","quantity":2}]
//! ```
//!
//! Decoding is lenient where it can be without breaking cart invariants:
//! `imageUrl` is accepted for `image_url`, prices may be numbers, and a
//! literal `null` reads as an empty cart. Records that would break the
//! invariants are repaired or dropped one at a time (see [`decode`]); a bad
//! record never costs the rest of the cart.

use std::num::NonZeroU32;

use serde::Deserialize;
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::warn;

use pocket_cart_core::{LineItem, ProductDescriptor};

/// Errors that can occur while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The text is not a valid snapshot.
    #[error("malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A line item as stored, before its quantity is checked.
///
/// The quantity is kept as a raw JSON number: other clients may write it as
/// a float or beyond the range of any integer type.
#[derive(Debug, Deserialize)]
struct StoredLineItem {
    #[serde(flatten)]
    product: ProductDescriptor,
    quantity: Number,
}

/// Serialize the cart.
///
/// # Errors
///
/// Returns `SnapshotError::Malformed` if serialization fails, which does not
/// happen for well-formed line items.
pub fn encode(items: &[LineItem]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(items)?)
}

/// Parse a snapshot back into line items.
///
/// Records are repaired so the result satisfies the cart invariants:
/// - a record missing a field or holding an invalid value is dropped
/// - quantities of zero or below, or with a fractional part, drop the record
/// - quantities above `u32::MAX` are clamped
/// - a repeated id is merged into its first occurrence, summing quantities
///
/// # Errors
///
/// Returns `SnapshotError::Malformed` if the text is not JSON or is not an
/// array (or `null`).
pub fn decode(raw: &str) -> Result<Vec<LineItem>, SnapshotError> {
    let records: Option<Vec<Value>> = serde_json::from_str(raw)?;
    let records = records
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable stored line item");
                None
            }
        });
    Ok(repair(records))
}

/// Parse a snapshot, falling back to an empty cart.
///
/// A malformed snapshot is logged and otherwise ignored; the next mutation
/// overwrites it.
#[must_use]
pub fn decode_or_empty(raw: &str) -> Vec<LineItem> {
    decode(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Discarding unreadable cart snapshot");
        Vec::new()
    })
}

fn repair(records: impl Iterator<Item = StoredLineItem>) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::new();

    for record in records {
        let Some(quantity) = clamp_quantity(&record.quantity) else {
            warn!(
                product_id = %record.product.id,
                quantity = %record.quantity,
                "Dropping stored line item with invalid quantity"
            );
            continue;
        };

        if let Some(existing) = items.iter_mut().find(|item| item.id() == &record.product.id) {
            warn!(product_id = %record.product.id, "Merging duplicate stored line item");
            existing.increment_by(quantity.get());
        } else {
            items.push(LineItem::with_quantity(record.product, quantity));
        }
    }

    items
}

/// Map a stored quantity to a valid one, or `None` if the record must go.
fn clamp_quantity(quantity: &Number) -> Option<NonZeroU32> {
    if let Some(q) = quantity.as_u64() {
        return match u32::try_from(q) {
            Ok(q) => NonZeroU32::new(q),
            Err(_) => Some(NonZeroU32::MAX),
        };
    }
    if quantity.is_i64() {
        // Negative
        return None;
    }

    let q = quantity.as_f64()?;
    if !q.is_finite() || q.fract() != 0.0 || q < 1.0 {
        return None;
    }
    if q >= f64::from(u32::MAX) {
        return Some(NonZeroU32::MAX);
    }
    // Whole number in 1..u32::MAX
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let q = q as u32;
    NonZeroU32::new(q)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pocket_cart_core::Price;

    use super::*;

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem::with_quantity(
            ProductDescriptor::new(id, format!("Product {id}"), "u", Price::from_cents(1000)),
            NonZeroU32::new(quantity).unwrap(),
        )
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let items = vec![item("B", 3), item("A", 1), item("C", 7)];
        let raw = encode(&items).unwrap();
        assert_eq!(decode(&raw).unwrap(), items);
    }

    #[test]
    fn test_empty_and_null_snapshots() {
        assert!(decode("[]").unwrap().is_empty());
        assert!(decode("null").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_snapshot_is_error() {
        assert!(decode("{not json").is_err());
        assert!(decode(r#"{"id":"A"}"#).is_err());
        assert!(decode(r#""products""#).is_err());
    }

    #[test]
    fn test_unreadable_record_dropped_alone() {
        let raw = r#"[{"id":"A"},
                     {"id":"B","title":"b","image_url":"u","price":"cheap","quantity":1},
                     {"id":"C","title":"c","image_url":"u","price":1,"quantity":1}]"#;
        let items = decode(raw).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id().as_str(), "C");
    }

    #[test]
    fn test_negative_price_record_dropped_alone() {
        let raw = r#"[{"id":"A","title":"a","image_url":"u","price":-5,"quantity":1},
                     {"id":"B","title":"b","image_url":"u","price":5,"quantity":1}]"#;
        let items = decode(raw).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id().as_str(), "B");
    }

    #[test]
    fn test_decode_or_empty_swallows_errors() {
        assert!(decode_or_empty("garbage").is_empty());
    }

    #[test]
    fn test_reads_original_wire_shape() {
        let raw = r#"[{"id":"A","title":"Shirt","image_url":"u","price":10,"quantity":2},
                     {"id":"B","title":"Hat","imageUrl":"v","price":5.5,"quantity":1}]"#;
        let items = decode(raw).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity().get(), 2);
        assert_eq!(items[0].price(), Price::from_cents(1000));
        assert_eq!(items[1].image_url(), "v");
        assert_eq!(items[1].price(), Price::from_cents(550));
    }

    #[test]
    fn test_non_positive_quantities_dropped() {
        let raw = r#"[{"id":"A","title":"a","image_url":"u","price":1,"quantity":0},
                     {"id":"B","title":"b","image_url":"u","price":1,"quantity":-2},
                     {"id":"C","title":"c","image_url":"u","price":1,"quantity":1}]"#;
        let items = decode(raw).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id().as_str(), "C");
    }

    #[test]
    fn test_duplicate_ids_merged_into_first() {
        let raw = r#"[{"id":"A","title":"first","image_url":"u","price":1,"quantity":2},
                     {"id":"B","title":"b","image_url":"u","price":1,"quantity":1},
                     {"id":"A","title":"second","image_url":"u","price":1,"quantity":3}]"#;
        let items = decode(raw).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id().as_str(), "A");
        assert_eq!(items[0].title(), "first");
        assert_eq!(items[0].quantity().get(), 5);
        assert_eq!(items[1].id().as_str(), "B");
    }

    #[test]
    fn test_huge_quantity_clamped_without_losing_neighbours() {
        let raw = r#"[{"id":"A","title":"a","image_url":"u","price":1,"quantity":1},
                     {"id":"B","title":"b","image_url":"u","price":1,"quantity":99999999999999999999},
                     {"id":"C","title":"c","image_url":"u","price":1,"quantity":4294967296}]"#;
        let items = decode(raw).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].quantity().get(), 1);
        assert_eq!(items[1].quantity(), NonZeroU32::MAX);
        assert_eq!(items[2].quantity(), NonZeroU32::MAX);
    }

    #[test]
    fn test_float_quantities() {
        let raw = r#"[{"id":"A","title":"a","image_url":"u","price":1,"quantity":2.0},
                     {"id":"B","title":"b","image_url":"u","price":1,"quantity":1.5},
                     {"id":"C","title":"c","image_url":"u","price":1,"quantity":1e20},
                     {"id":"D","title":"d","image_url":"u","price":1,"quantity":-3.0}]"#;
        let items = decode(raw).unwrap();

        let ids: Vec<_> = items.iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(items[0].quantity().get(), 2);
        assert_eq!(items[1].quantity(), NonZeroU32::MAX);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(&Number::from(u64::MAX)), Some(NonZeroU32::MAX));
        assert_eq!(clamp_quantity(&Number::from(0)), None);
        assert_eq!(clamp_quantity(&Number::from(-1)), None);
        assert_eq!(clamp_quantity(&Number::from(4)).map(NonZeroU32::get), Some(4));
    }
}
