//! # Catalog Types
//!
//! Product and variant documents as the inventory adjustment and the seller
//! listing read them. Fields this engine does not touch are preserved in
//! `extra` so merges never drop them.

use serde::{Deserialize, Serialize};

use super::order::SellerId;
use crate::store::Document;

/// Product identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Creates a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product variant with its own stock counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant ID.
    pub id:    String,
    /// Variant name (size, colour, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name:  Option<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Remaining variant fields.
    #[serde(flatten)]
    pub extra: Document,
}

/// Product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID (document id).
    #[serde(default, skip_serializing)]
    pub id:        ProductId,
    /// Product name.
    #[serde(default)]
    pub name:      String,
    /// Primary image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image:     Option<String>,
    /// Category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category:  Option<String>,
    /// Units in stock (products without variants).
    #[serde(default)]
    pub stock:     u32,
    /// Units sold.
    #[serde(default)]
    pub sold:      u32,
    /// Variants, each with its own stock.
    #[serde(default)]
    pub variants:  Vec<ProductVariant>,
    /// Owning seller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
    /// Optimistic-concurrency counter.
    #[serde(default)]
    pub version:   u64,
}

impl Product {
    /// Looks up a variant by ID.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Mutable variant lookup.
    pub fn variant_mut(&mut self, variant_id: &str) -> Option<&mut ProductVariant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    /// Whether the product tracks stock per variant.
    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}
