//! Pure order transitions.
//!
//! Each method checks the payment path and the current status, mutates the
//! order and appends a history event. Nothing here touches the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;

use super::{
    payouts::build_transfer_data,
    requests::{CheckoutRequest, SellerTransferRequest, ShipmentDetails},
};
use crate::{
    errors::{CommerceError, CommerceResult},
    types::{
        AdminVerificationStatus, BankAccount, CodStatus, Order, OrderAction,
        OrderHistoryEvent, OrderId, OrderStatus, PaymentMethod, PaymentStatus, SellerId,
        SellerTransferStatus, StockReduction, TransferStatus, TransferVerificationStatus,
    },
};

/// Builds the human-readable order number: `INV/<yyyymmdd>/<first 8 id chars>`.
#[must_use]
pub fn order_number(id: &OrderId, created_at: DateTime<Utc>) -> String {
    let short: String = id.as_str().chars().take(8).collect::<String>().to_uppercase();
    format!("INV/{}/{}", created_at.format("%Y%m%d"), short)
}

impl Order {
    /// Builds a new order from a validated checkout.
    ///
    /// Transfer orders carry `admin_fee`; cash-on-delivery orders carry none.
    /// The order has no id until the service stores it.
    pub fn place(
        request: CheckoutRequest, admin_fee: u64, now: DateTime<Utc>,
    ) -> CommerceResult<Self> {
        request.validate()?;

        let method = request.payment_method;
        let too_large = || CommerceError::Validation("Order total is too large".to_string());
        let subtotal = request
            .items
            .iter()
            .try_fold(0_u64, |sum, item| {
                item.price.checked_mul(u64::from(item.quantity)).and_then(|line| sum.checked_add(line))
            })
            .ok_or_else(too_large)?;
        let admin_fee = match method {
            PaymentMethod::Transfer => admin_fee,
            PaymentMethod::Cod => 0,
        };
        let total_amount = subtotal.checked_add(admin_fee).ok_or_else(too_large)?;
        let status = OrderStatus::initial(method);

        let (payment_status, admin_verification_status, seller_transfer_status) = match method {
            PaymentMethod::Transfer => (
                PaymentStatus::Pending,
                AdminVerificationStatus::Pending,
                SellerTransferStatus::Pending,
            ),
            PaymentMethod::Cod => (
                PaymentStatus::CodPending,
                AdminVerificationStatus::NotRequired,
                SellerTransferStatus::NotApplicable,
            ),
        };

        let created = OrderHistoryEvent {
            action: OrderAction::Created,
            from:   String::new(),
            to:     status.as_str().to_string(),
            actor:  Some(request.user_id.to_string()),
            note:   None,
            at:     now,
        };

        Ok(Self {
            id: OrderId::default(),
            order_number: String::new(),
            user_id: request.user_id,
            items: request.items,
            subtotal,
            admin_fee,
            total_amount,
            status,
            payment_status,
            payment_proof: None,
            payment_proof_uploaded_at: None,
            admin_verification_status,
            admin_notes: None,
            verified_by: None,
            verified_at: None,
            seller_transfer_status,
            seller_transfer_data: None,
            shipping_address: request.shipping_address,
            tracking_number: None,
            courier_whatsapp: None,
            courier_name: None,
            shipped_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            cancel_reason: None,
            notes: request.notes,
            stock_reduced: false,
            stock_reductions: Vec::new(),
            history: vec![created],
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    // ========================================================================
    // TRANSFER PATH
    // ========================================================================

    /// Buyer uploads (or re-uploads) a transfer proof.
    pub fn submit_payment_proof(&mut self, proof_url: &str, now: DateTime<Utc>) -> CommerceResult<()> {
        let action = OrderAction::PaymentProofSubmitted;
        let status = self.transfer_status(action)?;

        if !matches!(
            status,
            TransferStatus::Pending
                | TransferStatus::PendingPayment
                | TransferStatus::PendingVerification
        ) {
            return Err(self.invalid(action));
        }

        let proof = proof_url.trim();
        if proof.is_empty() {
            return Err(CommerceError::Validation("Payment proof is required".to_string()));
        }

        self.payment_proof = Some(proof.to_string());
        self.payment_proof_uploaded_at = Some(now);
        self.payment_status = PaymentStatus::ProofUploaded;
        self.admin_verification_status = AdminVerificationStatus::Pending;

        let buyer = self.user_id.to_string();
        self.advance(
            OrderStatus::Transfer(TransferStatus::PendingVerification),
            action,
            Some(buyer),
            None,
            now,
        );
        Ok(())
    }

    /// Admin accepts the transfer proof.
    pub fn approve_payment(
        &mut self, admin_id: &str, notes: Option<String>, now: DateTime<Utc>,
    ) -> CommerceResult<()> {
        let action = OrderAction::PaymentApproved;
        if self.transfer_status(action)? != TransferStatus::PendingVerification {
            return Err(self.invalid(action));
        }

        self.admin_verification_status = AdminVerificationStatus::Approved;
        self.payment_status = PaymentStatus::Confirmed;
        self.seller_transfer_status = SellerTransferStatus::Pending;
        self.verified_by = Some(admin_id.to_string());
        self.verified_at = Some(now);
        self.admin_notes.clone_from(&notes);

        self.advance(
            OrderStatus::Transfer(TransferStatus::PaymentConfirmed),
            action,
            Some(admin_id.to_string()),
            notes,
            now,
        );
        Ok(())
    }

    /// Admin rejects the transfer proof; the buyer may upload a new one.
    pub fn reject_payment(
        &mut self, admin_id: &str, notes: Option<String>, now: DateTime<Utc>,
    ) -> CommerceResult<()> {
        let action = OrderAction::PaymentRejected;
        if self.transfer_status(action)? != TransferStatus::PendingVerification {
            return Err(self.invalid(action));
        }

        self.admin_verification_status = AdminVerificationStatus::Rejected;
        self.payment_status = PaymentStatus::Rejected;
        self.verified_by = Some(admin_id.to_string());
        self.verified_at = Some(now);
        self.admin_notes.clone_from(&notes);

        self.advance(
            OrderStatus::Transfer(TransferStatus::PendingPayment),
            action,
            Some(admin_id.to_string()),
            notes,
            now,
        );
        Ok(())
    }

    /// Admin records the payout of the held funds to every seller.
    pub fn record_seller_transfer(
        &mut self, request: &SellerTransferRequest,
        profile_accounts: &BTreeMap<SellerId, BankAccount>, now: DateTime<Utc>,
    ) -> CommerceResult<()> {
        let action = OrderAction::SellerTransferred;
        if self.transfer_status(action)? != TransferStatus::PaymentConfirmed
            || !self.admin_verification_status.is_approved()
            || self.seller_transfer_status == SellerTransferStatus::Completed
        {
            return Err(self.invalid(action));
        }

        let data = build_transfer_data(self, request, profile_accounts, now)?;
        let note = format!("{} transferred to {} seller(s)", data.seller_amount, data.payouts.len());

        self.seller_transfer_data = Some(data);
        self.seller_transfer_status = SellerTransferStatus::Completed;

        self.advance(
            OrderStatus::Transfer(TransferStatus::Processing),
            action,
            Some(request.admin_id.clone()),
            Some(note),
            now,
        );
        Ok(())
    }

    /// Seller acknowledges (or disputes) the payout. The status does not move.
    pub fn verify_transfer_receipt(
        &mut self, seller_id: &SellerId, received: bool, now: DateTime<Utc>,
    ) -> CommerceResult<()> {
        let action = OrderAction::TransferReceiptVerified;
        self.transfer_status(action)?;
        self.require_seller(seller_id)?;

        if self.seller_transfer_status != SellerTransferStatus::Completed {
            return Err(self.invalid(action));
        }

        let order_id = self.id.to_string();
        let data = self.seller_transfer_data.as_mut().ok_or_else(|| {
            CommerceError::Validation(format!("Order {order_id} has no seller transfer record"))
        })?;
        let payout = data.payouts.get_mut(seller_id).ok_or_else(|| CommerceError::NotOrderSeller {
            order_id:  order_id.clone(),
            seller_id: seller_id.to_string(),
        })?;

        payout.verification_status = if received {
            TransferVerificationStatus::Verified
        } else {
            TransferVerificationStatus::Rejected
        };
        payout.is_verified = received;
        payout.verified_at = Some(now);
        data.refresh_verification(now);

        let from = self.status.as_str().to_string();
        let note = if received { "Funds received" } else { "Funds not received" };
        self.record(action, from, Some(seller_id.to_string()), Some(note.to_string()), now);
        Ok(())
    }

    /// Transfer order closes.
    pub fn complete(&mut self, actor: &str, now: DateTime<Utc>) -> CommerceResult<()> {
        let action = OrderAction::Completed;
        let status = self.transfer_status(action)?;
        if !matches!(status, TransferStatus::Shipped | TransferStatus::Delivered) {
            return Err(self.invalid(action));
        }

        self.delivered_at.get_or_insert(now);
        self.completed_at = Some(now);
        self.advance(
            OrderStatus::Transfer(TransferStatus::Completed),
            action,
            Some(actor.to_string()),
            None,
            now,
        );
        Ok(())
    }

    // ========================================================================
    // COD PATH
    // ========================================================================

    /// Seller accepts a cash-on-delivery order.
    pub fn accept_cod(&mut self, seller_id: &SellerId, now: DateTime<Utc>) -> CommerceResult<()> {
        let action = OrderAction::CodAccepted;
        if self.cod_status(action)? != CodStatus::CodConfirmed {
            return Err(self.invalid(action));
        }
        self.require_seller(seller_id)?;

        self.advance(
            OrderStatus::Cod(CodStatus::CodProcessing),
            action,
            Some(seller_id.to_string()),
            None,
            now,
        );
        Ok(())
    }

    // ========================================================================
    // SHARED
    // ========================================================================

    /// Seller hands the goods to the courier.
    ///
    /// Transfer orders need a tracking number or a courier WhatsApp contact;
    /// cash-on-delivery orders need the courier WhatsApp contact.
    pub fn ship(
        &mut self, seller_id: &SellerId, details: &ShipmentDetails, now: DateTime<Utc>,
    ) -> CommerceResult<()> {
        let action = OrderAction::Shipped;

        let next = match self.status {
            OrderStatus::Transfer(TransferStatus::Processing) => {
                if details.tracking_number().is_none() && details.courier_whatsapp().is_none() {
                    return Err(CommerceError::Validation(
                        "Tracking number or courier WhatsApp is required".to_string(),
                    ));
                }
                OrderStatus::Transfer(TransferStatus::Shipped)
            },
            OrderStatus::Cod(CodStatus::CodProcessing) => {
                if details.courier_whatsapp().is_none() {
                    return Err(CommerceError::Validation(
                        "Courier WhatsApp is required for COD shipments".to_string(),
                    ));
                }
                OrderStatus::Cod(CodStatus::CodShipped)
            },
            _ => return Err(self.invalid(action)),
        };
        self.require_seller(seller_id)?;

        self.tracking_number = details.tracking_number().map(str::to_string);
        self.courier_whatsapp = details.courier_whatsapp().map(str::to_string);
        self.courier_name = details.courier_name().map(str::to_string);
        self.shipped_at = Some(now);

        let note = self.tracking_number.clone().or_else(|| self.courier_whatsapp.clone());
        self.advance(next, action, Some(seller_id.to_string()), note, now);
        Ok(())
    }

    /// Goods received. For cash on delivery this also means the cash was paid.
    pub fn confirm_delivery(&mut self, actor: &str, now: DateTime<Utc>) -> CommerceResult<()> {
        let action = OrderAction::Delivered;

        let next = match self.status {
            OrderStatus::Transfer(TransferStatus::Shipped) => {
                OrderStatus::Transfer(TransferStatus::Delivered)
            },
            OrderStatus::Cod(CodStatus::CodShipped) => {
                self.payment_status = PaymentStatus::Paid;
                OrderStatus::Cod(CodStatus::CodDelivered)
            },
            _ => return Err(self.invalid(action)),
        };

        self.delivered_at = Some(now);
        self.advance(next, action, Some(actor.to_string()), None, now);
        Ok(())
    }

    /// Cancels an order that has not shipped yet. Stock is not restored.
    pub fn cancel(
        &mut self, actor: &str, reason: Option<String>, now: DateTime<Utc>,
    ) -> CommerceResult<()> {
        let action = OrderAction::Cancelled;
        if !self.status.is_cancellable() {
            return Err(self.invalid(action));
        }

        let next = match self.payment_method() {
            PaymentMethod::Transfer => OrderStatus::Transfer(TransferStatus::Cancelled),
            PaymentMethod::Cod => OrderStatus::Cod(CodStatus::Cancelled),
        };

        self.cancelled_at = Some(now);
        self.cancel_reason.clone_from(&reason);
        self.advance(next, action, Some(actor.to_string()), reason, now);
        Ok(())
    }

    /// Records the stock decrement applied for this order.
    pub fn mark_stock_reduced(&mut self, reductions: Vec<StockReduction>, now: DateTime<Utc>) {
        let note = format!("{} item(s) adjusted", reductions.len());
        self.stock_reduced = true;
        self.stock_reductions = reductions;

        let from = self.status.as_str().to_string();
        self.record(OrderAction::StockReduced, from, None, Some(note), now);
    }

    /// Whether the order reached the point where stock should be decremented.
    #[must_use]
    pub fn is_stock_due(&self) -> bool {
        match &self.status {
            OrderStatus::Transfer(status) => {
                self.admin_verification_status.is_approved() && *status != TransferStatus::Cancelled
            },
            OrderStatus::Cod(status) => {
                matches!(
                    status,
                    CodStatus::CodProcessing | CodStatus::CodShipped | CodStatus::CodDelivered
                )
            },
            OrderStatus::Unrecognized { .. } => false,
        }
    }

    // ========================================================================
    // GUARDS & BOOKKEEPING
    // ========================================================================

    pub(crate) fn invalid(&self, action: OrderAction) -> CommerceError {
        CommerceError::InvalidTransition {
            order_id: self.id.to_string(),
            status:   self.status.as_str().to_string(),
            action:   action.verb(),
        }
    }

    fn require_method(&self, expected: PaymentMethod) -> CommerceResult<()> {
        let actual = self.payment_method();
        if actual == expected {
            Ok(())
        } else {
            Err(CommerceError::PaymentMethodMismatch {
                order_id: self.id.to_string(),
                expected: expected.as_str(),
                actual:   actual.as_str(),
            })
        }
    }

    fn transfer_status(&self, action: OrderAction) -> CommerceResult<TransferStatus> {
        self.require_method(PaymentMethod::Transfer)?;
        match self.status {
            OrderStatus::Transfer(status) => Ok(status),
            _ => Err(self.invalid(action)),
        }
    }

    fn cod_status(&self, action: OrderAction) -> CommerceResult<CodStatus> {
        self.require_method(PaymentMethod::Cod)?;
        match self.status {
            OrderStatus::Cod(status) => Ok(status),
            _ => Err(self.invalid(action)),
        }
    }

    fn require_seller(&self, seller_id: &SellerId) -> CommerceResult<()> {
        if self.has_seller(seller_id) {
            Ok(())
        } else {
            Err(CommerceError::NotOrderSeller {
                order_id:  self.id.to_string(),
                seller_id: seller_id.to_string(),
            })
        }
    }

    fn advance(
        &mut self, next: OrderStatus, action: OrderAction, actor: Option<String>,
        note: Option<String>, now: DateTime<Utc>,
    ) {
        let from = std::mem::replace(&mut self.status, next).as_str().to_string();
        self.record(action, from, actor, note, now);
    }

    fn record(
        &mut self, action: OrderAction, from: String, actor: Option<String>, note: Option<String>,
        now: DateTime<Utc>,
    ) {
        info!(
            order_id = %self.id,
            action = ?action,
            from = %from,
            to = %self.status,
            "Order transition"
        );

        self.history.push(OrderHistoryEvent {
            action,
            from,
            to: self.status.as_str().to_string(),
            actor,
            note,
            at: now,
        });
        self.updated_at = now;
    }
}
