//! Conversion between typed records and raw store documents.
//!
//! Reads normalize documents written by older clients before typing them:
//! whole-number floats become integers, drifted field names are folded into
//! the canonical ones, missing money fields are recomputed and a missing
//! payment method is inferred from the status. Records only ever see the
//! canonical shape.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use super::{
    catalog::{Product, ProductId},
    order::{Order, OrderId},
    profile::UserProfile,
};
use crate::{
    config::DEFAULT_ADMIN_FEE,
    errors::{CommerceError, CommerceResult},
    store::{Document, StoredDocument},
};

/// Record stored as a document whose id lives outside the body.
pub trait StoredRecord: Serialize + DeserializeOwned {
    /// Sets the record id from the document id.
    fn assign_id(&mut self, id: &str);

    /// Rewrites legacy document shapes in place before deserialization.
    fn normalize(_doc: &mut Document) {}

    /// Decodes a stored document.
    fn from_stored(stored: StoredDocument) -> CommerceResult<Self> {
        let StoredDocument { id, mut data } = stored;
        data.values_mut().for_each(integralize);
        Self::normalize(&mut data);
        let mut record: Self = serde_json::from_value(Value::Object(data)).map_err(|e| {
            CommerceError::Serialization(format!("Malformed document '{id}': {e}"))
        })?;
        record.assign_id(&id);
        Ok(record)
    }

    /// Encodes the record body.
    fn to_document(&self) -> CommerceResult<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(CommerceError::Serialization(format!(
                "Record encoded as {other} instead of an object"
            ))),
        }
    }
}

/// Decodes a listing, skipping documents that do not decode.
pub fn decode_listing<T: StoredRecord>(docs: Vec<StoredDocument>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            T::from_stored(doc)
                .map_err(|err| warn!(id = %id, error = %err, "Skipping malformed document"))
                .ok()
        })
        .collect()
}

// ============================================================================
// LEGACY SHAPES
// ============================================================================

/// Legacy key and the canonical key it folds into.
type Rename = (&'static str, &'static str);

const ORDER_KEYS: &[Rename] = &[("total", "totalAmount"), ("courierWA", "courierWhatsapp")];

const ITEM_KEYS: &[Rename] = &[
    ("productName", "name"),
    ("productImage", "image"),
    ("storeId", "sellerId"),
    ("storeName", "sellerName"),
];

const ADDRESS_KEYS: &[Rename] =
    &[("recipientName", "recipient"), ("name", "recipient"), ("fullAddress", "address")];

const PRODUCT_KEYS: &[Rename] = &[("imageUrl", "image"), ("storeId", "sellerId")];

const PROFILE_KEYS: &[Rename] = &[
    ("displayName", "name"),
    ("fullName", "name"),
    ("phoneNumber", "phone"),
    ("photoURL", "avatar"),
    ("avatarUrl", "avatar"),
];

const BANK_KEYS: &[Rename] = &[("accountName", "accountHolder")];

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Turns whole-number floats (`10.0`) into integers, recursively.
fn integralize(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64()
                && f.fract() == 0.0
                && f.abs() <= MAX_SAFE_INTEGER
            {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = if f >= 0.0 { Value::from(f as u64) } else { Value::from(f as i64) };
                *value = whole;
            }
        },
        Value::Array(values) => values.iter_mut().for_each(integralize),
        Value::Object(map) => map.values_mut().for_each(integralize),
        _ => {},
    }
}

/// Moves each legacy key into its canonical key. A canonical value that is
/// present and not null wins; the legacy key is always removed.
fn fold_keys(doc: &mut Document, renames: &[Rename]) {
    for (legacy, canonical) in renames {
        let Some(value) = doc.remove(*legacy) else {
            continue;
        };
        let canonical_set = doc.get(*canonical).is_some_and(|v| !v.is_null());
        if !canonical_set && !value.is_null() {
            doc.insert((*canonical).to_string(), value);
        }
    }
}

/// Applies [`fold_keys`] to the object under `key`.
fn fold_object(doc: &mut Document, key: &str, renames: &[Rename]) {
    if let Some(Value::Object(inner)) = doc.get_mut(key) {
        fold_keys(inner, renames);
    }
}

/// Applies [`fold_keys`] to every object in the array under `key`.
fn fold_array(doc: &mut Document, key: &str, renames: &[Rename]) {
    if let Some(Value::Array(entries)) = doc.get_mut(key) {
        for entry in entries {
            if let Value::Object(inner) = entry {
                fold_keys(inner, renames);
            }
        }
    }
}

impl StoredRecord for Order {
    fn assign_id(&mut self, id: &str) {
        self.id = OrderId::new(id);
    }

    fn normalize(doc: &mut Document) {
        fold_keys(doc, ORDER_KEYS);
        fold_array(doc, "items", ITEM_KEYS);
        fold_object(doc, "shippingAddress", ADDRESS_KEYS);
        if let Some(Value::Object(transfer)) = doc.get_mut("sellerTransferData")
            && let Some(Value::Object(payouts)) = transfer.get_mut("payouts")
        {
            for payout in payouts.values_mut() {
                if let Value::Object(payout) = payout {
                    fold_object(payout, "sellerInfo", BANK_KEYS);
                }
            }
        }

        let is_cod = match doc.get("paymentMethod").and_then(Value::as_str) {
            Some(method) => method == "cod",
            None => {
                let inferred = doc
                    .get("status")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.starts_with("cod_"));
                let method = if inferred { "cod" } else { "transfer" };
                doc.insert("paymentMethod".to_string(), Value::from(method));
                inferred
            },
        };

        if !doc.contains_key("subtotal") {
            let subtotal: u64 = doc
                .get("items")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .map(|item| {
                            let price = item.get("price").and_then(Value::as_u64).unwrap_or(0);
                            let quantity =
                                item.get("quantity").and_then(Value::as_u64).unwrap_or(0);
                            price.saturating_mul(quantity)
                        })
                        .fold(0, u64::saturating_add)
                })
                .unwrap_or(0);
            doc.insert("subtotal".to_string(), Value::from(subtotal));
        }

        if !doc.contains_key("adminFee") {
            let fee = if is_cod { 0 } else { DEFAULT_ADMIN_FEE };
            doc.insert("adminFee".to_string(), Value::from(fee));
        }

        if !doc.contains_key("totalAmount") {
            let subtotal = doc.get("subtotal").and_then(Value::as_u64).unwrap_or(0);
            let fee = doc.get("adminFee").and_then(Value::as_u64).unwrap_or(0);
            doc.insert("totalAmount".to_string(), Value::from(subtotal.saturating_add(fee)));
        }
    }
}

impl StoredRecord for Product {
    fn assign_id(&mut self, id: &str) {
        self.id = ProductId::new(id);
    }

    fn normalize(doc: &mut Document) {
        fold_keys(doc, PRODUCT_KEYS);
    }
}

impl StoredRecord for UserProfile {
    fn assign_id(&mut self, _id: &str) {}

    fn normalize(doc: &mut Document) {
        fold_keys(doc, PROFILE_KEYS);
        fold_object(doc, "bankAccount", BANK_KEYS);
    }
}
