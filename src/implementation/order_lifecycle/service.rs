//! Service implementation.
//!
//! Every operation reads the order, applies one transition and commits the
//! order with the version it was read at. Stock writes ride in the same
//! commit.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{
    OrderService,
    requests::{CheckoutRequest, PaymentDecision, SellerTransferRequest, ShipmentDetails},
    transitions::order_number,
};
use crate::{
    config::CommerceConfig,
    errors::{CommerceError, CommerceResult},
    implementation::{inventory_adjustment::InventoryAdjuster, lookup::LookupCache},
    store::{DocumentStore, Filter, StoreError, WriteBatch},
    types::{
        BankAccount, Order, OrderAction, OrderId, SellerId, StoredRecord, UserId,
        document::decode_listing,
    },
};

impl OrderService {
    /// Creates an order service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: CommerceConfig) -> Self {
        let inventory = InventoryAdjuster::new(Arc::clone(&store), &config);
        Self { store, config, inventory }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &CommerceConfig {
        &self.config
    }

    // ========================================================================
    // CHECKOUT & READS
    // ========================================================================

    /// Places an order.
    pub fn create_order(&self, request: CheckoutRequest) -> CommerceResult<Order> {
        let now = self.store.server_time();
        let mut order = Order::place(request, self.config.fees.admin_fee, now)?;

        let id = self.store.allocate_id(&self.config.collections.orders);
        order.assign_id(&id);
        order.order_number = order_number(&order.id, now);

        self.save(&mut order, WriteBatch::new())?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            payment_method = order.payment_method().as_str(),
            total = order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Loads one order.
    pub fn get_order(&self, id: &OrderId) -> CommerceResult<Order> {
        let stored = self
            .store
            .get(&self.config.collections.orders, id.as_str())?
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
        Order::from_stored(stored)
    }

    /// Orders of one buyer, newest first. Malformed documents are skipped.
    pub fn list_buyer_orders(&self, user_id: &UserId) -> CommerceResult<Vec<Order>> {
        let docs = self
            .store
            .query(&self.config.collections.orders, &[Filter::eq("userId", user_id.as_str())])?;

        let mut orders: Vec<Order> = decode_listing(docs);

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    // ========================================================================
    // TRANSFER PATH
    // ========================================================================

    /// Buyer uploads a transfer proof.
    pub fn submit_payment_proof(&self, id: &OrderId, proof_url: &str) -> CommerceResult<Order> {
        self.transition(id, |order, now| order.submit_payment_proof(proof_url, now))
    }

    /// Admin approves or rejects the transfer proof.
    ///
    /// Approval decrements stock in the same commit, at most once per order.
    pub fn verify_payment(&self, id: &OrderId, decision: PaymentDecision) -> CommerceResult<Order> {
        let mut order = self.get_order(id)?;
        let now = self.store.server_time();
        let mut batch = WriteBatch::new();

        match decision {
            PaymentDecision::Approve { admin_id, notes } => {
                order.approve_payment(&admin_id, notes, now)?;
                self.inventory.stage(&mut order, &mut batch, now)?;
            },
            PaymentDecision::Reject { admin_id, notes } => {
                order.reject_payment(&admin_id, notes, now)?;
            },
        }

        self.save(&mut order, batch)?;
        Ok(order)
    }

    /// Admin records the payout to the sellers.
    pub fn transfer_to_seller(
        &self, id: &OrderId, request: &SellerTransferRequest,
    ) -> CommerceResult<Order> {
        let mut order = self.get_order(id)?;
        let accounts = self.profile_bank_accounts(&order, request);
        let now = self.store.server_time();

        order.record_seller_transfer(request, &accounts, now)?;
        self.save(&mut order, WriteBatch::new())?;
        Ok(order)
    }

    /// Seller confirms (or disputes) that the payout arrived.
    pub fn verify_transfer_receipt(
        &self, id: &OrderId, seller_id: &SellerId, received: bool,
    ) -> CommerceResult<Order> {
        self.transition(id, |order, now| order.verify_transfer_receipt(seller_id, received, now))
    }

    /// Closes a shipped or delivered transfer order.
    pub fn complete_order(&self, id: &OrderId, actor: &str) -> CommerceResult<Order> {
        self.transition(id, |order, now| order.complete(actor, now))
    }

    // ========================================================================
    // COD PATH
    // ========================================================================

    /// Seller accepts a cash-on-delivery order, decrementing stock when enabled.
    pub fn accept_cod_order(&self, id: &OrderId, seller_id: &SellerId) -> CommerceResult<Order> {
        let mut order = self.get_order(id)?;
        let now = self.store.server_time();
        let mut batch = WriteBatch::new();

        order.accept_cod(seller_id, now)?;
        if self.config.inventory.reduce_stock_on_cod {
            self.inventory.stage(&mut order, &mut batch, now)?;
        }

        self.save(&mut order, batch)?;
        Ok(order)
    }

    // ========================================================================
    // SHARED
    // ========================================================================

    /// Seller ships the order.
    pub fn ship_order(
        &self, id: &OrderId, seller_id: &SellerId, details: &ShipmentDetails,
    ) -> CommerceResult<Order> {
        self.transition(id, |order, now| order.ship(seller_id, details, now))
    }

    /// Buyer (or seller, for cash on delivery) confirms receipt.
    pub fn confirm_delivery(&self, id: &OrderId, actor: &str) -> CommerceResult<Order> {
        self.transition(id, |order, now| order.confirm_delivery(actor, now))
    }

    /// Cancels an order that has not shipped.
    pub fn cancel_order(
        &self, id: &OrderId, actor: &str, reason: Option<String>,
    ) -> CommerceResult<Order> {
        self.transition(id, |order, now| order.cancel(actor, reason, now))
    }

    /// Applies a stock decrement that is due but missing, e.g. after a failed
    /// commit. A no-op for orders already adjusted.
    ///
    /// Cash-on-delivery orders are refused when
    /// `inventory.reduce_stock_on_cod` is off.
    pub fn reduce_stock(&self, id: &OrderId) -> CommerceResult<Order> {
        let mut order = self.get_order(id)?;
        if order.stock_reduced {
            info!(order_id = %order.id, "Stock already reduced");
            return Ok(order);
        }
        if order.is_cod() && !self.config.inventory.reduce_stock_on_cod {
            return Err(CommerceError::Validation(format!(
                "Stock reduction is disabled for cash-on-delivery order {}",
                order.id
            )));
        }
        if !order.is_stock_due() {
            return Err(order.invalid(OrderAction::StockReduced));
        }

        let now = self.store.server_time();
        let mut batch = WriteBatch::new();
        self.inventory.stage(&mut order, &mut batch, now)?;
        self.save(&mut order, batch)?;
        Ok(order)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn transition<F>(&self, id: &OrderId, apply: F) -> CommerceResult<Order>
    where
        F: FnOnce(&mut Order, DateTime<Utc>) -> CommerceResult<()>,
    {
        let mut order = self.get_order(id)?;
        apply(&mut order, self.store.server_time())?;
        self.save(&mut order, WriteBatch::new())?;
        Ok(order)
    }

    /// Commits `order` plus `batch`, requiring the stored version to be the
    /// one the order was read at.
    fn save(&self, order: &mut Order, mut batch: WriteBatch) -> CommerceResult<()> {
        let expected = order.version;
        let orders = &self.config.collections.orders;
        batch.set(orders, order.id.as_str(), order.to_document()?, Some(expected));

        match self.store.commit(batch) {
            Ok(()) => {
                order.version = expected + 1;
                Ok(())
            },
            Err(StoreError::VersionConflict { collection, id, found, .. })
                if &collection == orders && id == order.id.as_str() =>
            {
                warn!(order_id = %order.id, expected, found, "Order modified concurrently");
                Err(CommerceError::ConcurrentModification {
                    order_id: order.id.to_string(),
                    expected,
                    found,
                })
            },
            Err(err) => {
                warn!(order_id = %order.id, error = %err, "Order commit failed");
                Err(err.into())
            },
        }
    }

    /// Bank accounts from the profiles of sellers the request has none for.
    fn profile_bank_accounts(
        &self, order: &Order, request: &SellerTransferRequest,
    ) -> BTreeMap<SellerId, BankAccount> {
        let mut cache = LookupCache::new(self.store.as_ref(), &self.config.collections);

        request
            .payouts
            .iter()
            .filter(|p| p.bank_account.is_none() && order.has_seller(&p.seller_id))
            .filter_map(|p| {
                let account = cache.user(p.seller_id.as_str())?.bank_account.clone()?;
                Some((p.seller_id.clone(), account))
            })
            .collect()
    }
}
