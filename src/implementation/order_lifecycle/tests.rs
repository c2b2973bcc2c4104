use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};

use super::*;
use crate::{
    config::CommerceConfig,
    errors::CommerceError,
    store::{
        DocumentStore, Filter, InMemoryDocumentStore, StoreResult, StoredDocument, WriteBatch,
    },
    test_support::{
        checkout, doc, fixed_time, item, order, product_field, seed_product, seed_user,
        seed_variant_product, service, service_with,
    },
    types::{
        AdminVerificationStatus, CodStatus, Order, OrderAction, OrderStatus, PaymentMethod,
        PaymentStatus, SellerId, SellerTransferStatus, TransferStatus, TransferVerificationStatus,
        UserId,
    },
};

fn transfer_order(service: &OrderService) -> Order {
    service
        .create_order(checkout(PaymentMethod::Transfer, vec![item("p1", "seller-a", 50_000, 2)]))
        .expect("create")
}

fn approved_order(store: &InMemoryDocumentStore, service: &OrderService) -> Order {
    seed_product(store, "p1", 10);
    let order = transfer_order(service);
    service.submit_payment_proof(&order.id, "https://img/proof.jpg").expect("proof");
    service.verify_payment(&order.id, PaymentDecision::approve("admin-1")).expect("approve")
}

// ============================================================================
// CHECKOUT
// ============================================================================

#[test]
fn test_transfer_total_includes_admin_fee() {
    let (_, service) = service();
    let order = service
        .create_order(checkout(PaymentMethod::Transfer, vec![item("p1", "seller-a", 50_000, 1)]))
        .expect("create");

    assert_eq!(order.subtotal, 50_000);
    assert_eq!(order.admin_fee, 1500);
    assert_eq!(order.total_amount, 51_500);
    assert_eq!(order.status, OrderStatus::Transfer(TransferStatus::Pending));
    assert_eq!(order.version, 1);
}

#[test]
fn test_cod_order_has_no_admin_fee() {
    let (_, service) = service();
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 50_000, 1)]))
        .expect("create");

    assert_eq!(order.admin_fee, 0);
    assert_eq!(order.total_amount, 50_000);
    assert_eq!(order.status, OrderStatus::Cod(CodStatus::CodConfirmed));
    assert_eq!(order.payment_status, PaymentStatus::CodPending);
    assert_eq!(order.admin_verification_status, AdminVerificationStatus::NotRequired);
    assert_eq!(order.seller_transfer_status, SellerTransferStatus::NotApplicable);
}

#[test]
fn test_configured_admin_fee_is_used() {
    let mut config = CommerceConfig::default();
    config.fees.admin_fee = 2500;
    let (_, service) = service_with(config);

    let order = transfer_order(&service);
    assert_eq!(order.admin_fee, 2500);
    assert_eq!(order.total_amount, 102_500);
}

#[test]
fn test_order_number_format() {
    let (_, service) = service();
    let order = transfer_order(&service);

    let expected_suffix: String = order.id.as_str().chars().take(8).collect::<String>().to_uppercase();
    assert_eq!(order.order_number, format!("INV/20240501/{expected_suffix}"));
}

#[test]
fn test_checkout_validation_rejects_before_writing() {
    let (store, service) = service();

    let mut no_address = checkout(PaymentMethod::Transfer, vec![item("p1", "seller-a", 1000, 1)]);
    no_address.shipping_address.city = "  ".to_string();
    let err = service.create_order(no_address).expect_err("missing city");
    assert!(err.is_validation());
    assert!(err.to_string().contains("city"));

    let empty = checkout(PaymentMethod::Cod, Vec::new());
    assert!(matches!(service.create_order(empty), Err(CommerceError::Validation(_))));

    let zero = checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 0)]);
    assert!(matches!(service.create_order(zero), Err(CommerceError::Validation(_))));

    assert_eq!(store.count("orders"), 0);
}

#[test]
fn test_checkout_total_overflow_is_rejected() {
    let (store, service) = service();
    let half = u64::MAX / 2 + 1;

    let lines = checkout(PaymentMethod::Cod, vec![
        item("p1", "seller-a", half, 1),
        item("p2", "seller-a", half, 1),
    ]);
    let err = service.create_order(lines).expect_err("subtotal overflow");
    assert!(err.is_validation());
    assert!(err.to_string().contains("too large"));

    let quantity = checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", half, 2)]);
    assert!(matches!(service.create_order(quantity), Err(CommerceError::Validation(_))));

    let fee = checkout(PaymentMethod::Transfer, vec![item("p1", "seller-a", u64::MAX, 1)]);
    assert!(matches!(service.create_order(fee), Err(CommerceError::Validation(_))));

    assert_eq!(store.count("orders"), 0);
}

#[test]
fn test_checkout_notes_are_stored() {
    let (_, service) = service();
    let request = checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)])
        .with_notes("Titip di pos satpam");

    let order = service.create_order(request).expect("create");

    assert_eq!(order.notes.as_deref(), Some("Titip di pos satpam"));
    assert_eq!(service.get_order(&order.id).expect("reload").notes, order.notes);
}

#[test]
fn test_get_order_not_found() {
    let (_, service) = service();
    let result = service.get_order(&crate::types::OrderId::new("missing"));
    assert!(matches!(result, Err(CommerceError::OrderNotFound(id)) if id == "missing"));
}

#[test]
fn test_list_buyer_orders_skips_other_buyers_and_malformed_docs() {
    let (store, service) = service();
    transfer_order(&service);
    transfer_order(&service);

    let mut other = checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]);
    other.user_id = UserId::new("buyer-2");
    service.create_order(other).expect("create");

    store
        .insert("orders", "broken", doc(serde_json::json!({ "userId": "buyer-1", "items": 7 })))
        .expect("insert");

    let orders = service.list_buyer_orders(&UserId::new("buyer-1")).expect("list");
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.user_id.as_str() == "buyer-1"));
}

// ============================================================================
// TRANSFER PATH
// ============================================================================

#[test]
fn test_payment_proof_moves_to_pending_verification() {
    let (_, service) = service();
    let order = transfer_order(&service);

    let order = service.submit_payment_proof(&order.id, " https://img/proof.jpg ").expect("proof");

    assert_eq!(order.status, OrderStatus::Transfer(TransferStatus::PendingVerification));
    assert_eq!(order.payment_status, PaymentStatus::ProofUploaded);
    assert_eq!(order.payment_proof.as_deref(), Some("https://img/proof.jpg"));
    assert_eq!(order.version, 2);
}

#[test]
fn test_blank_payment_proof_rejected() {
    let (_, service) = service();
    let order = transfer_order(&service);

    let result = service.submit_payment_proof(&order.id, "  ");
    assert!(matches!(result, Err(CommerceError::Validation(_))));
}

#[test]
fn test_cod_order_rejects_payment_proof() {
    let (_, service) = service();
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]))
        .expect("create");

    let err = service.submit_payment_proof(&order.id, "proof.jpg").expect_err("cod");
    assert!(matches!(
        err,
        CommerceError::PaymentMethodMismatch { expected: "transfer", actual: "cod", .. }
    ));
}

#[test]
fn test_approve_reduces_stock_once() {
    let (store, service) = service();
    let order = approved_order(&store, &service);

    assert_eq!(order.status, OrderStatus::Transfer(TransferStatus::PaymentConfirmed));
    assert_eq!(order.admin_verification_status, AdminVerificationStatus::Approved);
    assert_eq!(order.seller_transfer_status, SellerTransferStatus::Pending);
    assert!(order.stock_reduced);
    assert_eq!(order.stock_reductions.len(), 1);
    assert_eq!(product_field(&store, "p1", "stock"), 8);
    assert_eq!(product_field(&store, "p1", "sold"), 2);

    let again = service.verify_payment(&order.id, PaymentDecision::approve("admin-2"));
    assert!(matches!(again, Err(CommerceError::InvalidTransition { .. })));

    let retried = service.reduce_stock(&order.id).expect("no-op");
    assert!(retried.stock_reduced);
    assert_eq!(product_field(&store, "p1", "stock"), 8);
}

#[test]
fn test_reject_allows_proof_resubmission() {
    let (store, service) = service();
    seed_product(&store, "p1", 10);
    let order = transfer_order(&service);
    service.submit_payment_proof(&order.id, "blurry.jpg").expect("proof");

    let rejected = service
        .verify_payment(&order.id, PaymentDecision::reject("admin-1", "Bukti tidak terbaca"))
        .expect("reject");

    assert_eq!(rejected.status, OrderStatus::Transfer(TransferStatus::PendingPayment));
    assert_eq!(rejected.admin_verification_status, AdminVerificationStatus::Rejected);
    assert_eq!(rejected.admin_notes.as_deref(), Some("Bukti tidak terbaca"));
    assert!(!rejected.stock_reduced);
    assert_eq!(product_field(&store, "p1", "stock"), 10);

    let resubmitted = service.submit_payment_proof(&order.id, "clear.jpg").expect("resubmit");
    assert_eq!(resubmitted.status, OrderStatus::Transfer(TransferStatus::PendingVerification));
    assert_eq!(resubmitted.admin_verification_status, AdminVerificationStatus::Pending);
}

#[test]
fn test_failed_approval_commit_leaves_order_and_stock_untouched() {
    let (store, service) = service();
    seed_product(&store, "p1", 10);
    let order = transfer_order(&service);
    service.submit_payment_proof(&order.id, "proof.jpg").expect("proof");

    store.fail_next_commit("network down");
    let err = service.verify_payment(&order.id, PaymentDecision::approve("admin-1")).expect_err("down");
    assert!(err.is_retryable());

    let stored = service.get_order(&order.id).expect("get");
    assert!(!stored.stock_reduced);
    assert_eq!(stored.status, OrderStatus::Transfer(TransferStatus::PendingVerification));
    assert_eq!(product_field(&store, "p1", "stock"), 10);

    let approved = service.verify_payment(&order.id, PaymentDecision::approve("admin-1")).expect("retry");
    assert!(approved.stock_reduced);
    assert_eq!(product_field(&store, "p1", "stock"), 8);
}

/// Store that lets another writer win the race on the next versioned order commit.
#[derive(Default)]
struct RacingStore {
    inner: InMemoryDocumentStore,
    armed: AtomicBool,
}

impl DocumentStore for RacingStore {
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.inner.get(collection, id)
    }

    fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<StoredDocument>> {
        self.inner.query(collection, filters)
    }

    fn allocate_id(&self, collection: &str) -> String {
        self.inner.allocate_id(collection)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if self.armed.swap(false, Ordering::SeqCst) {
            for op in batch.ops() {
                if let Some(version) = op.expected_version
                    && op.collection == "orders"
                {
                    let current = self.inner.get("orders", &op.id)?.map(|d| d.data).unwrap_or_default();
                    let mut competing = WriteBatch::new();
                    competing.set("orders", op.id.clone(), current, Some(version));
                    self.inner.commit(competing)?;
                }
            }
        }
        self.inner.commit(batch)
    }

    fn server_time(&self) -> DateTime<Utc> {
        fixed_time()
    }
}

#[test]
fn test_concurrent_modification_is_detected() {
    let store = Arc::new(RacingStore::default());
    let service = OrderService::new(store.clone(), CommerceConfig::default());
    let order = transfer_order(&service);

    store.armed.store(true, Ordering::SeqCst);
    let err = service.submit_payment_proof(&order.id, "proof.jpg").expect_err("lost race");

    assert!(matches!(
        err,
        CommerceError::ConcurrentModification { expected: 1, found: 2, .. }
    ));
    assert!(err.is_retryable());
    let stored = service.get_order(&order.id).expect("get");
    assert_eq!(stored.status, OrderStatus::Transfer(TransferStatus::Pending));

    let retried = service.submit_payment_proof(&order.id, "proof.jpg").expect("retry");
    assert_eq!(retried.version, 3);
}

#[test]
fn test_transfer_to_single_seller() {
    let (store, service) = service();
    seed_user(&store, "seller-a", serde_json::json!({
        "storeName": "Toko A",
        "bankAccount": { "bankName": "BCA", "accountNumber": "123", "accountHolder": "Andi" }
    }));
    let order = approved_order(&store, &service);

    let request = SellerTransferRequest::new("admin-1", vec![
        PayoutInstruction::new(SellerId::new("seller-a"), "transfer.jpg").with_amount(98_500),
    ]);
    let order = service.transfer_to_seller(&order.id, &request).expect("transfer");

    assert_eq!(order.status, OrderStatus::Transfer(TransferStatus::Processing));
    assert_eq!(order.seller_transfer_status, SellerTransferStatus::Completed);

    let data = order.seller_transfer_data.as_ref().expect("transfer data");
    let payout = &data.payouts[&SellerId::new("seller-a")];
    assert!(!data.is_multi_seller);
    assert_eq!(data.seller_amount, 98_500);
    assert_eq!(payout.subtotal, 100_000);
    assert_eq!(payout.admin_fee, 1500);
    assert_eq!(payout.seller_info.as_ref().map(|b| b.bank_name.as_str()), Some("BCA"));
}

#[test]
fn test_transfer_requires_approval() {
    let (_, service) = service();
    let order = transfer_order(&service);

    let request = SellerTransferRequest::new("admin-1", vec![PayoutInstruction::new(
        SellerId::new("seller-a"),
        "transfer.jpg",
    )]);
    let result = service.transfer_to_seller(&order.id, &request);
    assert!(matches!(result, Err(CommerceError::InvalidTransition { .. })));
}

#[test]
fn test_multi_seller_transfer_splits_fee_and_requires_every_seller() {
    let (store, service) = service();
    seed_product(&store, "p1", 10);
    seed_product(&store, "p2", 10);
    let order = service
        .create_order(checkout(PaymentMethod::Transfer, vec![
            item("p1", "seller-a", 30_000, 1),
            item("p2", "seller-b", 10_000, 1),
        ]))
        .expect("create");
    service.submit_payment_proof(&order.id, "proof.jpg").expect("proof");
    service.verify_payment(&order.id, PaymentDecision::approve("admin-1")).expect("approve");

    let partial = SellerTransferRequest::new("admin-1", vec![PayoutInstruction::new(
        SellerId::new("seller-a"),
        "a.jpg",
    )]);
    let err = service.transfer_to_seller(&order.id, &partial).expect_err("missing seller-b");
    assert!(err.to_string().contains("seller-b"));

    let stranger = SellerTransferRequest::new("admin-1", vec![PayoutInstruction::new(
        SellerId::new("seller-z"),
        "z.jpg",
    )]);
    assert!(matches!(
        service.transfer_to_seller(&order.id, &stranger),
        Err(CommerceError::NotOrderSeller { .. })
    ));

    let full = SellerTransferRequest::new("admin-1", vec![
        PayoutInstruction::new(SellerId::new("seller-a"), "a.jpg"),
        PayoutInstruction::new(SellerId::new("seller-b"), "b.jpg"),
    ]);
    let order = service.transfer_to_seller(&order.id, &full).expect("transfer");
    let data = order.seller_transfer_data.expect("data");

    assert!(data.is_multi_seller);
    let a = &data.payouts[&SellerId::new("seller-a")];
    let b = &data.payouts[&SellerId::new("seller-b")];
    assert_eq!((a.subtotal, a.admin_fee, a.seller_amount), (30_000, 1125, 30_000));
    assert_eq!((b.subtotal, b.admin_fee, b.seller_amount), (10_000, 375, 10_000));
    assert_eq!(a.admin_fee + b.admin_fee, order.admin_fee);
    assert_eq!(data.seller_amount, order.total_amount - order.admin_fee);
}

#[test]
fn test_fee_split_remainder_goes_to_largest_seller() {
    let mut order = order(PaymentMethod::Transfer, vec![
        item("p1", "seller-a", 1, 1),
        item("p2", "seller-b", 1, 1),
        item("p3", "seller-c", 2, 1),
    ]);
    order.admin_fee = 1000;

    let shares = split_admin_fee(&order);
    assert_eq!(shares[&SellerId::new("seller-a")], 250);
    assert_eq!(shares[&SellerId::new("seller-b")], 250);
    assert_eq!(shares[&SellerId::new("seller-c")], 500);

    order.admin_fee = 1001;
    let shares = split_admin_fee(&order);
    assert_eq!(shares.values().sum::<u64>(), 1001);
    assert_eq!(shares[&SellerId::new("seller-c")], 501);
}

#[test]
fn test_seller_receipt_verification_keeps_status() {
    let (store, service) = service();
    seed_product(&store, "p2", 10);
    seed_product(&store, "p1", 10);
    let order = service
        .create_order(checkout(PaymentMethod::Transfer, vec![
            item("p1", "seller-a", 30_000, 1),
            item("p2", "seller-b", 10_000, 1),
        ]))
        .expect("create");
    service.submit_payment_proof(&order.id, "proof.jpg").expect("proof");
    service.verify_payment(&order.id, PaymentDecision::approve("admin-1")).expect("approve");
    service
        .transfer_to_seller(&order.id, &SellerTransferRequest::new("admin-1", vec![
            PayoutInstruction::new(SellerId::new("seller-a"), "a.jpg"),
            PayoutInstruction::new(SellerId::new("seller-b"), "b.jpg"),
        ]))
        .expect("transfer");

    let order = service
        .verify_transfer_receipt(&order.id, &SellerId::new("seller-a"), true)
        .expect("verify a");
    let data = order.seller_transfer_data.as_ref().expect("data");
    assert!(data.payouts[&SellerId::new("seller-a")].is_verified);
    assert!(!data.is_verified);
    assert_eq!(order.status, OrderStatus::Transfer(TransferStatus::Processing));

    let order = service
        .verify_transfer_receipt(&order.id, &SellerId::new("seller-b"), true)
        .expect("verify b");
    let data = order.seller_transfer_data.as_ref().expect("data");
    assert!(data.is_verified);
    assert_eq!(data.verification_status, TransferVerificationStatus::Verified);
    assert_eq!(order.status, OrderStatus::Transfer(TransferStatus::Processing));

    let stranger = service.verify_transfer_receipt(&order.id, &SellerId::new("seller-z"), true);
    assert!(matches!(stranger, Err(CommerceError::NotOrderSeller { .. })));
}

#[test]
fn test_ship_requires_tracking_or_courier_for_transfer() {
    let (store, service) = service();
    let order = approved_order(&store, &service);
    service
        .transfer_to_seller(&order.id, &SellerTransferRequest::new("admin-1", vec![
            PayoutInstruction::new(SellerId::new("seller-a"), "a.jpg"),
        ]))
        .expect("transfer");

    let seller = SellerId::new("seller-a");
    let blank = ShipmentDetails::tracked("   ");
    assert!(matches!(
        service.ship_order(&order.id, &seller, &blank),
        Err(CommerceError::Validation(_))
    ));

    let intruder = service.ship_order(&order.id, &SellerId::new("seller-z"), &ShipmentDetails::tracked("JNE1"));
    assert!(matches!(intruder, Err(CommerceError::NotOrderSeller { .. })));

    let shipped = service
        .ship_order(&order.id, &seller, &ShipmentDetails::courier("+628111"))
        .expect("ship via courier");
    assert_eq!(shipped.status, OrderStatus::Transfer(TransferStatus::Shipped));
    assert_eq!(shipped.courier_whatsapp.as_deref(), Some("+628111"));
    assert!(shipped.tracking_number.is_none());
    assert_eq!(shipped.shipped_at, Some(fixed_time()));
}

#[test]
fn test_ship_before_seller_transfer_is_rejected() {
    let (store, service) = service();
    let order = approved_order(&store, &service);

    let result =
        service.ship_order(&order.id, &SellerId::new("seller-a"), &ShipmentDetails::tracked("JNE1"));
    assert!(matches!(result, Err(CommerceError::InvalidTransition { .. })));
}

#[test]
fn test_complete_from_delivered() {
    let (store, service) = service();
    let order = approved_order(&store, &service);
    service
        .transfer_to_seller(&order.id, &SellerTransferRequest::new("admin-1", vec![
            PayoutInstruction::new(SellerId::new("seller-a"), "a.jpg"),
        ]))
        .expect("transfer");
    service
        .ship_order(&order.id, &SellerId::new("seller-a"), &ShipmentDetails::tracked("JNE1"))
        .expect("ship");
    service.confirm_delivery(&order.id, "buyer-1").expect("deliver");

    let completed = service.complete_order(&order.id, "buyer-1").expect("complete");
    assert_eq!(completed.status, OrderStatus::Transfer(TransferStatus::Completed));
    assert!(completed.completed_at.is_some());
    assert!(completed.delivered_at.is_some());

    let again = service.complete_order(&order.id, "buyer-1");
    assert!(matches!(again, Err(CommerceError::InvalidTransition { .. })));
}

// ============================================================================
// COD PATH
// ============================================================================

#[test]
fn test_cod_accept_reduces_variant_stock() {
    let (store, service) = service();
    seed_variant_product(&store, "shirt", &[("m", 5), ("l", 1)]);
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![
            item("shirt", "seller-a", 80_000, 3).with_variant("l", Some("L".to_string())),
        ]))
        .expect("create");

    let order = service.accept_cod_order(&order.id, &SellerId::new("seller-a")).expect("accept");

    assert_eq!(order.status, OrderStatus::Cod(CodStatus::CodProcessing));
    assert!(order.stock_reduced);
    let variants = product_field(&store, "shirt", "variants");
    assert_eq!(variants[1]["stock"], 0);
    assert_eq!(variants[0]["stock"], 5);
    assert_eq!(product_field(&store, "shirt", "sold"), 3);
}

#[test]
fn test_cod_accept_without_stock_reduction_when_disabled() {
    let mut config = CommerceConfig::default();
    config.inventory.reduce_stock_on_cod = false;
    let (store, service) = service_with(config);
    seed_product(&store, "p1", 4);
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 2)]))
        .expect("create");

    let order = service.accept_cod_order(&order.id, &SellerId::new("seller-a")).expect("accept");

    assert!(!order.stock_reduced);
    assert_eq!(product_field(&store, "p1", "stock"), 4);
}

#[test]
fn test_manual_cod_stock_reduction_respects_config() {
    let mut config = CommerceConfig::default();
    config.inventory.reduce_stock_on_cod = false;
    let (store, service) = service_with(config);
    seed_product(&store, "p1", 4);
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 2)]))
        .expect("create");
    service.accept_cod_order(&order.id, &SellerId::new("seller-a")).expect("accept");

    let err = service.reduce_stock(&order.id).expect_err("disabled for cod");

    assert!(matches!(err, CommerceError::Validation(_)));
    assert_eq!(product_field(&store, "p1", "stock"), 4);
    assert!(!service.get_order(&order.id).expect("reload").stock_reduced);
}

#[test]
fn test_cod_accept_by_other_seller_rejected() {
    let (_, service) = service();
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]))
        .expect("create");

    let result = service.accept_cod_order(&order.id, &SellerId::new("seller-b"));
    assert!(matches!(result, Err(CommerceError::NotOrderSeller { .. })));
}

#[test]
fn test_cod_ship_requires_courier_whatsapp() {
    let (store, service) = service();
    seed_product(&store, "p1", 4);
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]))
        .expect("create");
    service.accept_cod_order(&order.id, &SellerId::new("seller-a")).expect("accept");

    let tracked_only = service.ship_order(
        &order.id,
        &SellerId::new("seller-a"),
        &ShipmentDetails::tracked("JNE1"),
    );
    assert!(matches!(tracked_only, Err(CommerceError::Validation(_))));
}

#[test]
fn test_cod_delivery_marks_paid() {
    let (store, service) = service();
    seed_product(&store, "p1", 4);
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]))
        .expect("create");
    service.accept_cod_order(&order.id, &SellerId::new("seller-a")).expect("accept");
    service
        .ship_order(&order.id, &SellerId::new("seller-a"), &ShipmentDetails::courier("+62812"))
        .expect("ship");

    let delivered = service.confirm_delivery(&order.id, "buyer-1").expect("deliver");

    assert_eq!(delivered.status, OrderStatus::Cod(CodStatus::CodDelivered));
    assert_eq!(delivered.payment_status, PaymentStatus::Paid);

    let complete = service.complete_order(&order.id, "buyer-1");
    assert!(matches!(complete, Err(CommerceError::PaymentMethodMismatch { .. })));
}

// ============================================================================
// CANCEL & HISTORY
// ============================================================================

#[test]
fn test_cancel_only_before_shipment() {
    let (store, service) = service();
    seed_product(&store, "p1", 4);
    let order = service
        .create_order(checkout(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]))
        .expect("create");
    service.accept_cod_order(&order.id, &SellerId::new("seller-a")).expect("accept");

    let cancelled = service
        .cancel_order(&order.id, "buyer-1", Some("Salah alamat".to_string()))
        .expect("cancel");
    assert_eq!(cancelled.status, OrderStatus::Cod(CodStatus::Cancelled));
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("Salah alamat"));
    // stock is not restored
    assert_eq!(product_field(&store, "p1", "stock"), 3);

    let again = service.cancel_order(&order.id, "buyer-1", None);
    assert!(matches!(again, Err(CommerceError::InvalidTransition { .. })));
}

#[test]
fn test_shipped_order_cannot_be_cancelled() {
    let mut order = order(PaymentMethod::Cod, vec![item("p1", "seller-a", 1000, 1)]);
    let seller = SellerId::new("seller-a");
    order.accept_cod(&seller, fixed_time()).expect("accept");
    order.ship(&seller, &ShipmentDetails::courier("+62812"), fixed_time()).expect("ship");

    let err = order.cancel("buyer-1", None, fixed_time()).expect_err("shipped");
    assert!(matches!(err, CommerceError::InvalidTransition { action: "cancel", .. }));
}

#[test]
fn test_history_records_every_transition() {
    let (store, service) = service();
    let order = approved_order(&store, &service);

    let actions: Vec<OrderAction> = order.history.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![
        OrderAction::Created,
        OrderAction::PaymentProofSubmitted,
        OrderAction::PaymentApproved,
        OrderAction::StockReduced,
    ]);
    assert_eq!(order.history[2].from, "pending_verification");
    assert_eq!(order.history[2].to, "payment_confirmed");
    assert_eq!(order.history[2].actor.as_deref(), Some("admin-1"));
}

#[test]
fn test_unrecognized_status_rejects_transitions() {
    let (store, service) = service();
    let order = transfer_order(&service);
    let mut raw = store.get("orders", order.id.as_str()).expect("get").expect("exists").data;
    raw.insert("status".to_string(), "on_hold".into());
    store.insert("orders", order.id.as_str(), raw).expect("insert");

    let result = service.submit_payment_proof(&order.id, "proof.jpg");
    assert!(matches!(result, Err(CommerceError::InvalidTransition { status, .. }) if status == "on_hold"));
    assert!(service.cancel_order(&order.id, "buyer-1", None).is_err());
}
