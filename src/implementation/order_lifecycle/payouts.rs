//! Per-seller payout computation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::requests::SellerTransferRequest;
use crate::{
    errors::{CommerceError, CommerceResult},
    types::{
        BankAccount, Order, SellerId, SellerPayout, SellerTransferData, TransferVerificationStatus,
    },
};

/// Splits the order's admin fee across its sellers.
///
/// Shares are proportional to seller subtotals and always sum to the order
/// fee; the rounding remainder goes to the seller with the largest subtotal.
#[must_use]
pub fn split_admin_fee(order: &Order) -> BTreeMap<SellerId, u64> {
    let subtotals: Vec<(SellerId, u64)> = order
        .seller_ids()
        .into_iter()
        .map(|seller| (seller.clone(), order.seller_subtotal(seller)))
        .collect();

    let total: u64 = subtotals.iter().map(|(_, s)| s).sum();
    let fee = order.admin_fee;

    let mut shares: BTreeMap<SellerId, u64> = subtotals
        .iter()
        .map(|(seller, subtotal)| {
            let share = if total == 0 {
                0
            } else {
                let share = u128::from(fee) * u128::from(*subtotal) / u128::from(total);
                u64::try_from(share).unwrap_or(fee)
            };
            (seller.clone(), share)
        })
        .collect();

    let assigned: u64 = shares.values().sum();
    if let Some((seller, _)) = subtotals.iter().max_by_key(|(_, subtotal)| *subtotal)
        && let Some(share) = shares.get_mut(seller)
    {
        *share += fee.saturating_sub(assigned);
    }

    shares
}

/// Builds the payout record for an order from the admin's instructions.
///
/// Every seller of the order needs exactly one instruction with at least one
/// receipt image. Bank details fall back to `profile_accounts` when the
/// instruction carries none.
pub fn build_transfer_data(
    order: &Order, request: &SellerTransferRequest,
    profile_accounts: &BTreeMap<SellerId, BankAccount>, now: DateTime<Utc>,
) -> CommerceResult<SellerTransferData> {
    let fees = split_admin_fee(order);
    let mut seen = BTreeSet::new();
    let mut payouts = BTreeMap::new();

    for instruction in &request.payouts {
        let seller_id = &instruction.seller_id;

        if !order.has_seller(seller_id) {
            return Err(CommerceError::NotOrderSeller {
                order_id:  order.id.to_string(),
                seller_id: seller_id.to_string(),
            });
        }

        if !seen.insert(seller_id.clone()) {
            return Err(CommerceError::Validation(format!(
                "Seller {seller_id} appears twice in the transfer"
            )));
        }

        let proofs: Vec<String> = instruction
            .transfer_proofs
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        if proofs.is_empty() {
            return Err(CommerceError::Validation(format!(
                "Transfer proof is required for seller {seller_id}"
            )));
        }

        let subtotal = order.seller_subtotal(seller_id);
        let seller_info = instruction
            .bank_account
            .clone()
            .or_else(|| profile_accounts.get(seller_id).cloned());

        payouts.insert(seller_id.clone(), SellerPayout {
            seller_id: seller_id.clone(),
            subtotal,
            admin_fee: fees.get(seller_id).copied().unwrap_or(0),
            seller_amount: instruction.amount.unwrap_or(subtotal),
            transfer_proofs: proofs,
            seller_info,
            is_verified: false,
            verification_status: TransferVerificationStatus::Pending,
            verified_at: None,
        });
    }

    if let Some(missing) = order.seller_ids().into_iter().find(|s| !seen.contains(*s)) {
        return Err(CommerceError::Validation(format!("Missing payout for seller {missing}")));
    }

    Ok(SellerTransferData {
        is_multi_seller: order.is_multi_seller(),
        seller_amount: payouts.values().map(|p| p.seller_amount).sum(),
        admin_fee: order.admin_fee,
        payouts,
        transferred_at: now,
        transferred_by: Some(request.admin_id.clone()),
        notes: request.notes.clone(),
        is_verified: false,
        verification_status: TransferVerificationStatus::Pending,
        verified_at: None,
    })
}
