use std::sync::Arc;

use super::*;
use crate::{
    config::CommerceConfig,
    errors::CommerceError,
    store::{DocumentStore, InMemoryDocumentStore, WriteBatch},
    test_support::{fixed_time, item, order, product_field, seed_product, seed_variant_product},
    types::PaymentMethod,
};

fn adjuster(store: &InMemoryDocumentStore, strict: bool) -> InventoryAdjuster {
    let mut config = CommerceConfig::default();
    config.inventory.strict = strict;
    InventoryAdjuster::new(Arc::new(store.clone()), &config)
}

#[test]
fn test_top_level_stock_floors_at_zero() {
    let store = InMemoryDocumentStore::new();
    seed_product(&store, "p1", 1);

    let plan = adjuster(&store, false).plan(&[item("p1", "seller-a", 1000, 3)]).expect("plan");

    let product = &plan.products[&ProductId::new("p1")];
    assert_eq!(product.stock, 0);
    assert_eq!(product.sold, 3);
    assert_eq!(plan.reductions[0].old_stock, 1);
    assert_eq!(plan.reductions[0].new_stock, 0);
    assert_eq!(plan.reductions[0].quantity, 3);
}

#[test]
fn test_items_on_same_product_share_one_read() {
    let store = InMemoryDocumentStore::new();
    seed_variant_product(&store, "shirt", &[("m", 5), ("l", 5)]);

    let plan = adjuster(&store, false)
        .plan(&[
            item("shirt", "seller-a", 1000, 2).with_variant("m", None),
            item("shirt", "seller-a", 1000, 1).with_variant("l", None),
            item("shirt", "seller-a", 1000, 1).with_variant("m", None),
        ])
        .expect("plan");

    let product = &plan.products[&ProductId::new("shirt")];
    assert_eq!(product.variant("m").map(|v| v.stock), Some(2));
    assert_eq!(product.variant("l").map(|v| v.stock), Some(4));
    assert_eq!(product.sold, 4);
    assert_eq!(product.stock, 0);
    assert_eq!(plan.reductions[2].old_stock, 3);
    assert_eq!(store.read_count("products"), 1);
}

#[test]
fn test_lenient_mode_skips_missing_products() {
    let store = InMemoryDocumentStore::new();
    seed_product(&store, "p1", 5);

    let plan = adjuster(&store, false)
        .plan(&[
            item("ghost", "seller-a", 1000, 1),
            item("p1", "seller-a", 1000, 1),
            item("p1", "seller-a", 1000, 1).with_variant("xl", None),
        ])
        .expect("lenient plan");

    assert_eq!(plan.reductions.len(), 1);
    assert_eq!(plan.skipped.len(), 2);
    assert_eq!(plan.skipped[0].product_id, ProductId::new("ghost"));
    assert!(plan.skipped[1].reason.contains("xl"));
}

#[test]
fn test_strict_mode_fails_on_missing_product() {
    let store = InMemoryDocumentStore::new();
    seed_product(&store, "p1", 5);

    let result = adjuster(&store, true)
        .plan(&[item("p1", "seller-a", 1000, 1), item("ghost", "seller-a", 1000, 1)]);

    assert!(matches!(result, Err(CommerceError::ProductNotFound(id)) if id == "ghost"));
}

#[test]
fn test_stage_marks_order_and_commits_with_it() {
    let store = InMemoryDocumentStore::new();
    seed_product(&store, "p1", 10);
    let mut order = order(PaymentMethod::Transfer, vec![item("p1", "seller-a", 1000, 4)]);
    let mut batch = WriteBatch::new();

    let staged = adjuster(&store, false).stage(&mut order, &mut batch, fixed_time()).expect("stage");

    assert!(staged);
    assert!(order.stock_reduced);
    assert_eq!(batch.len(), 1);
    // nothing is written until the caller commits
    assert_eq!(product_field(&store, "p1", "stock"), 10);

    store.commit(batch).expect("commit");
    assert_eq!(product_field(&store, "p1", "stock"), 6);
    assert_eq!(product_field(&store, "p1", "sold"), 4);
}

#[test]
fn test_stage_is_noop_for_adjusted_orders() {
    let store = InMemoryDocumentStore::new();
    seed_product(&store, "p1", 10);
    let mut order = order(PaymentMethod::Transfer, vec![item("p1", "seller-a", 1000, 4)]);
    order.stock_reduced = true;
    let mut batch = WriteBatch::new();

    let staged = adjuster(&store, false).stage(&mut order, &mut batch, fixed_time()).expect("stage");

    assert!(!staged);
    assert!(batch.is_empty());
    assert_eq!(store.read_count("products"), 0);
}

#[test]
fn test_concurrent_product_write_fails_the_batch() {
    let store = InMemoryDocumentStore::new();
    seed_product(&store, "p1", 10);
    let mut order = order(PaymentMethod::Transfer, vec![item("p1", "seller-a", 1000, 1)]);
    let mut batch = WriteBatch::new();
    adjuster(&store, false).stage(&mut order, &mut batch, fixed_time()).expect("stage");

    // another order's adjustment lands first
    let mut other = WriteBatch::new();
    other.merge_versioned("products", "p1", crate::test_support::doc(serde_json::json!({ "stock": 7 })), 0);
    store.commit(other).expect("other commit");

    assert!(store.commit(batch).is_err());
    assert_eq!(product_field(&store, "p1", "stock"), 7);
}
