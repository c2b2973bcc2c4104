//! # Inventory Adjustment
//!
//! Decrements product or variant stock (floored at zero) and bumps `sold`
//! for every line item of an order, at most once per order.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    store::DocumentStore,
    types::{Product, ProductId, StockReduction},
};

mod service;

#[cfg(test)]
mod tests;

/// Computes and stages stock decrements.
#[derive(Clone)]
pub struct InventoryAdjuster {
    /// Store holding the products.
    store:    Arc<dyn DocumentStore>,
    /// Products collection.
    products: String,
    /// Fail on missing products instead of skipping them.
    strict:   bool,
}

impl std::fmt::Debug for InventoryAdjuster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryAdjuster")
            .field("products", &self.products)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

/// Line item left out of an adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Product of the item.
    pub product_id: ProductId,
    /// Why it was skipped.
    pub reason:     String,
}

/// Outcome of planning an adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct StockPlan {
    /// Audit of every applied decrement.
    pub reductions: Vec<StockReduction>,
    /// Items skipped in lenient mode.
    pub skipped:    Vec<SkippedItem>,
    /// Adjusted products, ready to write.
    pub products:   BTreeMap<ProductId, Product>,
}
