//! # Transactions
//!
//! Admin-facing read model over transfer orders. Each order gets a filter
//! bucket derived from the shared fulfilment stage, the fee the platform
//! keeps and the amount owed to the sellers. Cash-on-delivery orders never
//! need an admin and are left out entirely.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::{
    config::CommerceConfig,
    store::DocumentStore,
    types::{
        AdminVerificationStatus, BankAccount, OrderId, SellerId, SellerPayout,
        SellerTransferStatus, UserId,
    },
};

mod service;


pub use service::{project_transaction, transaction_filter};

/// Admin listing bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionFilter {
    /// Awaiting the buyer's proof or the admin's verification.
    PendingVerification,
    /// Verified, platform still owes the seller.
    PendingSellerTransfer,
    /// Seller paid, goods not yet delivered.
    Verified,
    /// Seller paid and goods delivered.
    Completed,
    /// Payment rejected or order cancelled.
    Rejected,
}

impl TransactionFilter {
    /// Every bucket, in display order.
    pub const ALL: [Self; 5] = [
        Self::PendingVerification,
        Self::PendingSellerTransfer,
        Self::Verified,
        Self::Completed,
        Self::Rejected,
    ];

    /// Label shown on the admin filter chips.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PendingVerification => "Pending Verifikasi",
            Self::PendingSellerTransfer => "Pending Transfer Seller",
            Self::Verified => "Terverifikasi",
            Self::Completed => "Selesai",
            Self::Rejected => "Ditolak",
        }
    }
}

impl std::fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TransactionFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One seller of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerParty {
    /// Seller ID.
    pub seller_id:    SellerId,
    /// Store or seller name.
    pub name:         String,
    /// Payout account, from the profile or the transfer snapshot.
    pub bank_account: Option<BankAccount>,
    /// Sum of the seller's line totals.
    pub subtotal:     u64,
    /// Recorded payout, once transferred.
    pub payout:       Option<SellerPayout>,
}

/// Transfer order as the admin sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTransactionView {
    pub order_id:                  OrderId,
    pub order_number:              String,
    pub buyer_id:                  UserId,
    /// Buyer name (profile, else shipping recipient).
    pub buyer_name:                String,
    /// Distinct sellers, in item order.
    pub sellers:                   Vec<SellerParty>,
    pub subtotal:                  u64,
    pub total_amount:              u64,
    /// Fee retained by the platform.
    pub admin_fee:                 u64,
    /// Total amount minus the fee.
    pub seller_amount:             u64,
    /// Amount actually paid out to sellers, once transferred.
    pub transferred_amount:        Option<u64>,
    /// Transfer receipts across all payouts.
    pub transfer_proofs:           Vec<String>,
    /// Stored status.
    pub status:                    String,
    pub status_label:              &'static str,
    pub filter_type:               TransactionFilter,
    pub admin_verification_status: AdminVerificationStatus,
    pub seller_transfer_status:    SellerTransferStatus,
    pub payment_proof:             Option<String>,
    pub created_at:                DateTime<Utc>,
}

/// Aggregates over all transfer orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    /// Transfer orders.
    pub total_transactions:      usize,
    /// Fees of orders whose seller transfer completed.
    pub total_admin_revenue:     u64,
    /// Orders awaiting proof or verification.
    pub pending_verification:    usize,
    /// Verified orders awaiting the seller transfer.
    pub pending_seller_transfer: usize,
    /// Orders whose seller transfer completed.
    pub completed:               usize,
    /// Rejected or cancelled orders.
    pub rejected:                usize,
    /// Orders per bucket label.
    pub by_filter:               BTreeMap<TransactionFilter, usize>,
}

/// Admin transaction listing service.
#[derive(Clone)]
pub struct TransactionService {
    store:  Arc<dyn DocumentStore>,
    config: CommerceConfig,
}

impl std::fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionService").field("config", &self.config).finish_non_exhaustive()
    }
}
