//! Transaction projector, listing and statistics.

use std::sync::Arc;

use tracing::debug;

use super::{
    AdminTransactionView, SellerParty, TransactionFilter, TransactionService, TransactionStats,
};
use crate::{
    config::CommerceConfig,
    errors::CommerceResult,
    implementation::{
        lookup::LookupCache,
        status_projection::{FulfilmentStage, derive_stage, status_label},
    },
    store::DocumentStore,
    types::{
        AdminVerificationStatus, Order, SellerTransferStatus, document::decode_listing,
        profile::UNKNOWN_USER_NAME,
    },
};

/// Admin bucket of a transfer order.
///
/// Stages past verification are bucketed by the payout bookkeeping: an order
/// the seller shipped before being paid still shows up as owing a transfer.
#[must_use]
pub fn transaction_filter(order: &Order) -> TransactionFilter {
    let transferred = order.seller_transfer_status == SellerTransferStatus::Completed;

    match derive_stage(order) {
        FulfilmentStage::Cancelled | FulfilmentStage::PaymentRejected => TransactionFilter::Rejected,
        FulfilmentStage::AwaitingPayment | FulfilmentStage::AwaitingVerification => {
            TransactionFilter::PendingVerification
        },
        FulfilmentStage::AwaitingSellerTransfer => TransactionFilter::PendingSellerTransfer,
        stage @ (FulfilmentStage::Processing
        | FulfilmentStage::Shipped
        | FulfilmentStage::Delivered
        | FulfilmentStage::Completed) => {
            if !transferred {
                pending_bucket(order.admin_verification_status)
            } else if matches!(stage, FulfilmentStage::Delivered | FulfilmentStage::Completed) {
                TransactionFilter::Completed
            } else {
                TransactionFilter::Verified
            }
        },
        FulfilmentStage::Unrecognized(_) => match order.admin_verification_status {
            AdminVerificationStatus::Rejected => TransactionFilter::Rejected,
            _ if transferred => TransactionFilter::Verified,
            verification => pending_bucket(verification),
        },
    }
}

fn pending_bucket(verification: AdminVerificationStatus) -> TransactionFilter {
    if verification.is_approved() {
        TransactionFilter::PendingSellerTransfer
    } else {
        TransactionFilter::PendingVerification
    }
}

/// Projects a transfer order for the admin. Cash-on-delivery orders yield
/// `None`.
///
/// Names come from the snapshots embedded in the order; the listing replaces
/// them with live profile data when it can.
#[must_use]
pub fn project_transaction(order: &Order) -> Option<AdminTransactionView> {
    if order.is_cod() {
        return None;
    }

    let transfer = order.seller_transfer_data.as_ref();
    let payouts = transfer.map(|data| &data.payouts);
    let sellers = order
        .seller_ids()
        .into_iter()
        .map(|seller_id| {
            let name = order
                .items_for_seller(seller_id)
                .find_map(|item| item.seller_name.clone().filter(|n| !n.trim().is_empty()))
                .unwrap_or_else(|| seller_id.to_string());
            let payout = payouts.and_then(|p| p.get(seller_id)).cloned();

            SellerParty {
                seller_id: seller_id.clone(),
                name,
                bank_account: payout.as_ref().and_then(|p| p.seller_info.clone()),
                subtotal: order.seller_subtotal(seller_id),
                payout,
            }
        })
        .collect();

    let recipient = order.shipping_address.recipient.trim();
    let buyer_name = if recipient.is_empty() { UNKNOWN_USER_NAME } else { recipient };

    Some(AdminTransactionView {
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        buyer_id: order.user_id.clone(),
        buyer_name: buyer_name.to_string(),
        sellers,
        subtotal: order.subtotal,
        total_amount: order.total_amount,
        admin_fee: order.admin_fee,
        seller_amount: order.total_amount.saturating_sub(order.admin_fee),
        transferred_amount: transfer.map(|data| data.seller_amount),
        transfer_proofs: transfer
            .map(|data| data.all_proofs().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        status: order.status.as_str().to_string(),
        status_label: status_label(order.status.as_str()),
        filter_type: transaction_filter(order),
        admin_verification_status: order.admin_verification_status,
        seller_transfer_status: order.seller_transfer_status,
        payment_proof: order.payment_proof.clone(),
        created_at: order.created_at,
    })
}

impl TransactionService {
    /// Creates a transaction service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: CommerceConfig) -> Self {
        Self { store, config }
    }

    /// Every transfer order, newest first, with live buyer and seller names.
    pub fn list_transactions(&self) -> CommerceResult<Vec<AdminTransactionView>> {
        let mut views: Vec<AdminTransactionView> =
            self.load_orders()?.iter().filter_map(project_transaction).collect();

        let mut cache = LookupCache::new(self.store.as_ref(), &self.config.collections);
        for view in &mut views {
            enrich(view, &mut cache);
        }

        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(transactions = views.len(), "Transactions listed");
        Ok(views)
    }

    /// Transfer orders in one bucket.
    pub fn list_transactions_by_filter(
        &self, filter: TransactionFilter,
    ) -> CommerceResult<Vec<AdminTransactionView>> {
        let mut views = self.list_transactions()?;
        views.retain(|view| view.filter_type == filter);
        Ok(views)
    }

    /// Counters and admin revenue over every transfer order. No lookups are
    /// made.
    pub fn transaction_stats(&self) -> CommerceResult<TransactionStats> {
        let mut stats = TransactionStats::default();

        for view in self.load_orders()?.iter().filter_map(project_transaction) {
            stats.total_transactions += 1;
            *stats.by_filter.entry(view.filter_type).or_insert(0) += 1;

            match view.filter_type {
                TransactionFilter::PendingVerification => stats.pending_verification += 1,
                TransactionFilter::PendingSellerTransfer => stats.pending_seller_transfer += 1,
                TransactionFilter::Rejected => stats.rejected += 1,
                TransactionFilter::Verified | TransactionFilter::Completed => {},
            }

            if view.seller_transfer_status == SellerTransferStatus::Completed {
                stats.completed += 1;
                stats.total_admin_revenue += view.admin_fee;
            }
        }

        Ok(stats)
    }

    fn load_orders(&self) -> CommerceResult<Vec<Order>> {
        let docs = self.store.query(&self.config.collections.orders, &[])?;
        Ok(decode_listing(docs))
    }
}

fn enrich(view: &mut AdminTransactionView, cache: &mut LookupCache<'_>) {
    if let Some(name) = cache.user(view.buyer_id.as_str()).and_then(|p| p.display_name()) {
        view.buyer_name = name.to_string();
    }

    for seller in &mut view.sellers {
        let Some(profile) = cache.user(seller.seller_id.as_str()) else {
            continue;
        };
        if let Some(name) = profile.store_display_name() {
            seller.name = name.to_string();
        }
        if seller.bank_account.is_none() {
            seller.bank_account = profile.bank_account.clone().filter(|a| a.is_complete());
        }
    }
}
