//! # Storefront Actions
//!
//! Entry points for the app screens. Each action wraps one service call and
//! hands back an [`ActionResult`] carrying either the payload or a readable
//! error, so nothing the engine raises reaches the caller as an error value.

use std::sync::Arc;

use crate::{
    config::CommerceConfig,
    errors::ActionResult,
    implementation::{
        order_lifecycle::{
            CheckoutRequest, OrderService, PaymentDecision, SellerTransferRequest,
            ShipmentDetails,
        },
        seller_orders::{SellerOrderService, SellerOrderSummary, SellerOrderView},
        transactions::{
            AdminTransactionView, TransactionFilter, TransactionService, TransactionStats,
        },
    },
    store::DocumentStore,
    types::{Order, OrderId, SellerId, UserId},
};

/// Every storefront operation behind one handle.
#[derive(Debug, Clone)]
pub struct StorefrontActions {
    orders:       OrderService,
    sellers:      SellerOrderService,
    transactions: TransactionService,
}

impl StorefrontActions {
    /// Wires the services over one store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: CommerceConfig) -> Self {
        Self {
            orders:       OrderService::new(Arc::clone(&store), config.clone()),
            sellers:      SellerOrderService::new(Arc::clone(&store), config.clone()),
            transactions: TransactionService::new(store, config),
        }
    }

    /// Order lifecycle service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    // ========================================================================
    // BUYER
    // ========================================================================

    pub fn create_order(&self, request: CheckoutRequest) -> ActionResult<Order> {
        self.orders.create_order(request).into()
    }

    pub fn get_order(&self, id: &OrderId) -> ActionResult<Order> {
        self.orders.get_order(id).into()
    }

    pub fn list_buyer_orders(&self, user_id: &UserId) -> ActionResult<Vec<Order>> {
        self.orders.list_buyer_orders(user_id).into()
    }

    pub fn submit_payment_proof(&self, id: &OrderId, proof_url: &str) -> ActionResult<Order> {
        self.orders.submit_payment_proof(id, proof_url).into()
    }

    pub fn confirm_delivery(&self, id: &OrderId, actor: &str) -> ActionResult<Order> {
        self.orders.confirm_delivery(id, actor).into()
    }

    pub fn cancel_order(
        &self, id: &OrderId, actor: &str, reason: Option<String>,
    ) -> ActionResult<Order> {
        self.orders.cancel_order(id, actor, reason).into()
    }

    // ========================================================================
    // SELLER
    // ========================================================================

    pub fn list_seller_orders(&self, seller_id: &SellerId) -> ActionResult<Vec<SellerOrderView>> {
        self.sellers.list_seller_orders(seller_id).into()
    }

    pub fn seller_summary(&self, seller_id: &SellerId) -> ActionResult<SellerOrderSummary> {
        self.sellers.seller_summary(seller_id).into()
    }

    pub fn accept_cod_order(&self, id: &OrderId, seller_id: &SellerId) -> ActionResult<Order> {
        self.orders.accept_cod_order(id, seller_id).into()
    }

    pub fn ship_order(
        &self, id: &OrderId, seller_id: &SellerId, details: &ShipmentDetails,
    ) -> ActionResult<Order> {
        self.orders.ship_order(id, seller_id, details).into()
    }

    pub fn verify_transfer_receipt(
        &self, id: &OrderId, seller_id: &SellerId, received: bool,
    ) -> ActionResult<Order> {
        self.orders.verify_transfer_receipt(id, seller_id, received).into()
    }

    // ========================================================================
    // ADMIN
    // ========================================================================

    pub fn verify_payment(&self, id: &OrderId, decision: PaymentDecision) -> ActionResult<Order> {
        self.orders.verify_payment(id, decision).into()
    }

    pub fn transfer_to_seller(
        &self, id: &OrderId, request: &SellerTransferRequest,
    ) -> ActionResult<Order> {
        self.orders.transfer_to_seller(id, request).into()
    }

    pub fn complete_order(&self, id: &OrderId, actor: &str) -> ActionResult<Order> {
        self.orders.complete_order(id, actor).into()
    }

    pub fn reduce_stock(&self, id: &OrderId) -> ActionResult<Order> {
        self.orders.reduce_stock(id).into()
    }

    pub fn list_transactions(
        &self, filter: Option<TransactionFilter>,
    ) -> ActionResult<Vec<AdminTransactionView>> {
        match filter {
            Some(filter) => self.transactions.list_transactions_by_filter(filter).into(),
            None => self.transactions.list_transactions().into(),
        }
    }

    pub fn transaction_stats(&self) -> ActionResult<TransactionStats> {
        self.transactions.transaction_stats().into()
    }
}
