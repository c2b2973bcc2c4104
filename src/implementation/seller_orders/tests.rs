use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::{
    implementation::status_projection::UNKNOWN_STATUS_LABEL,
    store::InMemoryDocumentStore,
    test_support::{doc, fixed_time, item, order, seed_user},
    types::{
        AdminVerificationStatus, CodStatus, Order, OrderStatus, SellerId, SellerTransferStatus,
        StoredRecord, TransferStatus,
    },
};

fn store_order(store: &InMemoryDocumentStore, id: &str, order: &Order) {
    store.insert("orders", id, order.to_document().expect("doc")).expect("insert");
}

fn multi_seller() -> Order {
    order(PaymentMethod::Transfer, vec![
        item("p1", "seller-a", 20_000, 2),
        item("p2", "seller-b", 15_000, 1),
        item("p3", "seller-a", 5_000, 1),
    ])
}

#[test]
fn test_projection_keeps_only_the_sellers_items() {
    let order = multi_seller();

    let view = project_seller_order(&order, &SellerId::new("seller-a")).expect("has items");

    assert_eq!(view.items.len(), 2);
    assert!(view.items.iter().all(|i| i.product_id.as_str() != "p2"));
    assert_eq!(view.subtotal, 45_000);
    assert_eq!(view.item_count, 3);

    let b = project_seller_order(&order, &SellerId::new("seller-b")).expect("has items");
    assert_eq!(b.subtotal, 15_000);
}

#[test]
fn test_projection_excludes_unrelated_seller() {
    assert!(project_seller_order(&multi_seller(), &SellerId::new("seller-z")).is_none());
}

#[test]
fn test_transfer_status_mapping() {
    let seller = SellerId::new("seller-a");
    let mut order = multi_seller();
    order.status = OrderStatus::Transfer(TransferStatus::PendingVerification);

    let view = project_seller_order(&order, &seller).expect("view");
    assert_eq!(view.status, SellerStatus::PendingVerification);
    assert_eq!(view.status_label, "Menunggu Verifikasi Admin");

    order.status = OrderStatus::Transfer(TransferStatus::PaymentConfirmed);
    order.admin_verification_status = AdminVerificationStatus::Approved;
    let view = project_seller_order(&order, &seller).expect("view");
    assert_eq!(view.status, SellerStatus::WaitingTransfer);
    assert_eq!(view.status_label, "Menunggu Transfer Dana");

    order.seller_transfer_status = SellerTransferStatus::Completed;
    assert_eq!(project_seller_order(&order, &seller).expect("view").status, SellerStatus::Processing);

    order.status = OrderStatus::Transfer(TransferStatus::PendingPayment);
    order.admin_verification_status = AdminVerificationStatus::Rejected;
    assert_eq!(project_seller_order(&order, &seller).expect("view").status, SellerStatus::Cancelled);
}

#[test]
fn test_shipped_order_never_reported_earlier() {
    let mut order = multi_seller();
    order.status = OrderStatus::Transfer(TransferStatus::Shipped);
    order.admin_verification_status = AdminVerificationStatus::Pending;
    order.seller_transfer_status = SellerTransferStatus::Pending;

    let view = project_seller_order(&order, &SellerId::new("seller-a")).expect("view");
    assert_eq!(view.status, SellerStatus::Shipped);
    assert_eq!(view.status_label, "Dikirim");
}

#[test]
fn test_cod_status_mapping_and_labels() {
    let seller = SellerId::new("seller-a");
    let mut order = order(PaymentMethod::Cod, vec![item("p1", "seller-a", 10_000, 1)]);
    let cases = [
        (CodStatus::CodConfirmed, SellerStatus::PendingVerification, "COD - Pesanan Dikonfirmasi"),
        (CodStatus::CodProcessing, SellerStatus::Processing, "COD - Sedang Diproses"),
        (CodStatus::CodShipped, SellerStatus::Shipped, "COD - Dalam Pengiriman"),
        (CodStatus::CodDelivered, SellerStatus::Delivered, "COD - Barang Diterima & Dibayar"),
    ];

    for (raw, status, label) in cases {
        order.status = OrderStatus::Cod(raw);
        let view = project_seller_order(&order, &seller).expect("view");
        assert_eq!(view.status, status);
        assert_eq!(view.status_label, label);
    }
}

#[test]
fn test_unknown_status_gets_fallback_label() {
    let mut order = multi_seller();
    order.status = OrderStatus::parse(PaymentMethod::Transfer, "on_hold");

    let view = project_seller_order(&order, &SellerId::new("seller-a")).expect("view");

    assert_eq!(view.status, SellerStatus::Unknown("on_hold".to_string()));
    assert_eq!(view.status_label, UNKNOWN_STATUS_LABEL);
    assert_eq!(serde_json::to_value(&view.status).expect("json"), json!("on_hold"));
}

#[test]
fn test_listing_enriches_with_cached_lookups() {
    let store = InMemoryDocumentStore::new();
    store
        .insert("products", "p1", doc(json!({ "name": "Kopi Gayo", "image": "kopi.jpg", "stock": 3 })))
        .expect("seed");
    seed_user(&store, "buyer-1", json!({ "name": "Rina Wati", "phone": "0899", "avatar": "rina.png" }));

    let mut first = multi_seller();
    first.created_at = fixed_time();
    let mut second = multi_seller();
    second.created_at = first.created_at + chrono::Duration::hours(1);
    store_order(&store, "o1", &first);
    store_order(&store, "o2", &second);
    store_order(&store, "o3", &order(PaymentMethod::Cod, vec![item("p9", "seller-z", 1, 1)]));

    let service = SellerOrderService::new(Arc::new(store.clone()), CommerceConfig::default());
    let views = service.list_seller_orders(&SellerId::new("seller-a")).expect("list");

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].order_id.as_str(), "o2");
    assert_eq!(views[0].buyer.name, "Rina Wati");
    assert_eq!(views[0].buyer.avatar.as_deref(), Some("rina.png"));
    assert_eq!(views[0].items[0].name, "Kopi Gayo");
    assert_eq!(views[0].items[0].image.as_deref(), Some("kopi.jpg"));
    // p3 has no product document, the embedded snapshot stays
    assert_eq!(views[0].items[1].name, "Produk p3");

    // two orders, one buyer and two distinct products
    assert_eq!(store.read_count("users"), 1);
    assert_eq!(store.read_count("products"), 2);
}

#[test]
fn test_listing_survives_failed_lookups() {
    let store = InMemoryDocumentStore::new();
    store.fail_reads_for("users");
    store.fail_reads_for("products");
    store_order(&store, "o1", &multi_seller());

    let service = SellerOrderService::new(Arc::new(store.clone()), CommerceConfig::default());
    let views = service.list_seller_orders(&SellerId::new("seller-b")).expect("list");

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].buyer.name, "Rina");
    assert_eq!(views[0].items[0].name, "Produk p2");
}

#[test]
fn test_seller_summary_counts_and_revenue() {
    let store = InMemoryDocumentStore::new();

    let mut delivered = multi_seller();
    delivered.status = OrderStatus::Transfer(TransferStatus::Delivered);
    store_order(&store, "o1", &delivered);

    let mut processing = multi_seller();
    processing.status = OrderStatus::Transfer(TransferStatus::Processing);
    store_order(&store, "o2", &processing);

    store_order(&store, "o3", &order(PaymentMethod::Cod, vec![item("p1", "seller-a", 7_000, 1)]));
    store_order(&store, "o4", &multi_seller());

    let service = SellerOrderService::new(Arc::new(store), CommerceConfig::default());
    let summary = service.seller_summary(&SellerId::new("seller-a")).expect("summary");

    assert_eq!(summary.total_orders, 4);
    assert_eq!(summary.by_status["delivered"], 1);
    assert_eq!(summary.by_status["processing"], 1);
    assert_eq!(summary.by_status["pending_verification"], 2);
    assert_eq!(summary.revenue, 45_000);
    // the processing order to ship and the COD order to accept
    assert_eq!(summary.awaiting_action, 2);
}
