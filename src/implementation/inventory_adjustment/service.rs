//! # Inventory Adjustment Implementation
//!
//! Turns the line items of an order into product writes that join the
//! order's own commit.

use std::{
    collections::{BTreeMap, BTreeSet, btree_map::Entry},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::{InventoryAdjuster, SkippedItem, StockPlan};
use crate::{
    config::CommerceConfig,
    errors::{CommerceError, CommerceResult},
    store::{Document, DocumentStore, WriteBatch},
    types::{LineItem, Order, Product, ProductId, StockReduction, StoredRecord},
};

impl InventoryAdjuster {
    /// Creates an adjuster over the configured products collection.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: &CommerceConfig) -> Self {
        Self {
            store,
            products: config.collections.products.clone(),
            strict: config.inventory.strict,
        }
    }

    /// Computes the stock decrement for a set of line items.
    ///
    /// Items on the same product share one read. In lenient mode a product
    /// that cannot be read, or a variant that no longer exists, is skipped
    /// with a warning; in strict mode it fails the whole plan.
    pub fn plan(&self, items: &[LineItem]) -> CommerceResult<StockPlan> {
        let mut products: BTreeMap<ProductId, Product> = BTreeMap::new();
        let mut touched: BTreeSet<ProductId> = BTreeSet::new();
        let mut reductions = Vec::new();
        let mut skipped = Vec::new();

        for item in items {
            let product = match products.entry(item.product_id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match self.fetch(&item.product_id) {
                    Ok(product) => entry.insert(product),
                    Err(err) => {
                        if self.strict {
                            return Err(err);
                        }
                        warn!(product_id = %item.product_id, error = %err, "Skipping stock adjustment");
                        skipped.push(SkippedItem {
                            product_id: item.product_id.clone(),
                            reason:     err.to_string(),
                        });
                        continue;
                    },
                },
            };

            let (variant_id, old_stock) = match &item.selected_variant {
                Some(selected) => match product.variant_mut(&selected.id) {
                    Some(variant) => {
                        let old = variant.stock;
                        variant.stock = old.saturating_sub(item.quantity);
                        (Some(selected.id.clone()), old)
                    },
                    None => {
                        let reason = format!(
                            "Variant {} not found on product {}",
                            selected.id, item.product_id
                        );
                        if self.strict {
                            return Err(CommerceError::Validation(reason));
                        }
                        warn!(product_id = %item.product_id, variant_id = %selected.id, "Skipping stock adjustment for missing variant");
                        skipped.push(SkippedItem { product_id: item.product_id.clone(), reason });
                        continue;
                    },
                },
                None => {
                    let old = product.stock;
                    product.stock = old.saturating_sub(item.quantity);
                    (None, old)
                },
            };

            product.sold = product.sold.saturating_add(item.quantity);
            touched.insert(item.product_id.clone());

            reductions.push(StockReduction {
                product_id: item.product_id.clone(),
                variant_id,
                old_stock,
                new_stock: old_stock.saturating_sub(item.quantity),
                quantity: item.quantity,
            });
        }

        products.retain(|id, _| touched.contains(id));
        Ok(StockPlan { reductions, skipped, products })
    }

    /// Adds the stock decrement for `order` to `batch` and marks the order.
    ///
    /// Returns `false` without touching anything when the order was already
    /// adjusted. The caller commits `batch` together with the order so the
    /// product writes and `stockReduced` land together or not at all.
    pub fn stage(
        &self, order: &mut Order, batch: &mut WriteBatch, now: DateTime<Utc>,
    ) -> CommerceResult<bool> {
        if order.stock_reduced {
            warn!(order_id = %order.id, "Stock already reduced for order, skipping");
            return Ok(false);
        }

        let plan = self.plan(&order.items)?;

        for (id, product) in &plan.products {
            let mut fields = Document::new();
            fields.insert("stock".to_string(), Value::from(product.stock));
            fields.insert("sold".to_string(), Value::from(product.sold));
            if product.has_variants() {
                fields.insert("variants".to_string(), serde_json::to_value(&product.variants)?);
            }
            batch.merge_versioned(&self.products, id.as_str(), fields, product.version);
        }

        info!(
            order_id = %order.id,
            products = plan.products.len(),
            skipped = plan.skipped.len(),
            "Stock reduction staged"
        );

        order.mark_stock_reduced(plan.reductions, now);
        Ok(true)
    }

    fn fetch(&self, product_id: &ProductId) -> CommerceResult<Product> {
        let stored = self
            .store
            .get(&self.products, product_id.as_str())?
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        Product::from_stored(stored)
    }
}
