//! Inputs to the lifecycle operations.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{CommerceError, CommerceResult},
    types::{BankAccount, LineItem, PaymentMethod, SellerId, ShippingAddress, UserId},
};

/// Checkout submitted by a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Buyer.
    pub user_id:          UserId,
    /// Items taken from the cart.
    pub items:            Vec<LineItem>,
    /// Payment method chosen.
    pub payment_method:   PaymentMethod,
    /// Shipping address.
    pub shipping_address: ShippingAddress,
    /// Buyer notes.
    #[serde(default)]
    pub notes:            Option<String>,
}

impl CheckoutRequest {
    /// Creates a checkout without items.
    #[must_use]
    pub fn new(
        user_id: UserId, payment_method: PaymentMethod, shipping_address: ShippingAddress,
    ) -> Self {
        Self { user_id, items: Vec::new(), payment_method, shipping_address, notes: None }
    }

    /// Adds an item.
    #[must_use]
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    /// Sets buyer notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Rejects incomplete checkouts.
    pub fn validate(&self) -> CommerceResult<()> {
        if self.user_id.as_str().trim().is_empty() {
            return Err(CommerceError::Validation("Buyer is required".to_string()));
        }

        if self.items.is_empty() {
            return Err(CommerceError::Validation("Order has no items".to_string()));
        }

        for item in &self.items {
            if item.product_id.as_str().trim().is_empty() {
                return Err(CommerceError::Validation("Item without product".to_string()));
            }
            if item.seller_id.as_str().trim().is_empty() {
                return Err(CommerceError::Validation(format!(
                    "Item '{}' has no seller",
                    item.name
                )));
            }
            if item.quantity == 0 {
                return Err(CommerceError::Validation(format!(
                    "Item '{}' has zero quantity",
                    item.name
                )));
            }
        }

        self.shipping_address.validate()
    }
}

/// Admin decision on a transfer proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PaymentDecision {
    /// Payment received.
    Approve {
        /// Admin.
        admin_id: String,
        /// Notes.
        notes:    Option<String>,
    },
    /// Proof not acceptable.
    Reject {
        /// Admin.
        admin_id: String,
        /// Reason shown to the buyer.
        notes:    Option<String>,
    },
}

impl PaymentDecision {
    /// Approval without notes.
    #[must_use]
    pub fn approve(admin_id: impl Into<String>) -> Self {
        Self::Approve { admin_id: admin_id.into(), notes: None }
    }

    /// Rejection with a reason.
    #[must_use]
    pub fn reject(admin_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reject { admin_id: admin_id.into(), notes: Some(reason.into()) }
    }
}

/// Payout to one seller, as entered by the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutInstruction {
    /// Seller paid.
    pub seller_id:       SellerId,
    /// Transfer receipt images.
    pub transfer_proofs: Vec<String>,
    /// Amount actually transferred; defaults to the seller's subtotal.
    #[serde(default)]
    pub amount:          Option<u64>,
    /// Bank account used; defaults to the one on the seller's profile.
    #[serde(default)]
    pub bank_account:    Option<BankAccount>,
}

impl PayoutInstruction {
    /// Payout backed by one receipt image.
    #[must_use]
    pub fn new(seller_id: SellerId, proof: impl Into<String>) -> Self {
        Self { seller_id, transfer_proofs: vec![proof.into()], amount: None, bank_account: None }
    }

    /// Records the transferred amount.
    #[must_use]
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Admin record of paying out the sellers of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerTransferRequest {
    /// Admin.
    pub admin_id: String,
    /// One instruction per seller of the order.
    pub payouts:  Vec<PayoutInstruction>,
    /// Notes.
    #[serde(default)]
    pub notes:    Option<String>,
}

impl SellerTransferRequest {
    /// Transfer request.
    #[must_use]
    pub fn new(admin_id: impl Into<String>, payouts: Vec<PayoutInstruction>) -> Self {
        Self { admin_id: admin_id.into(), payouts, notes: None }
    }
}

/// Shipment details entered by the seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShipmentDetails {
    /// Courier tracking number.
    pub tracking_number:  Option<String>,
    /// Courier WhatsApp contact.
    pub courier_whatsapp: Option<String>,
    /// Courier name.
    pub courier_name:     Option<String>,
}

impl ShipmentDetails {
    /// Shipment tracked by number.
    #[must_use]
    pub fn tracked(tracking_number: impl Into<String>) -> Self {
        Self { tracking_number: Some(tracking_number.into()), ..Self::default() }
    }

    /// Shipment handled by a courier reachable on WhatsApp.
    #[must_use]
    pub fn courier(whatsapp: impl Into<String>) -> Self {
        Self { courier_whatsapp: Some(whatsapp.into()), ..Self::default() }
    }

    pub(crate) fn tracking_number(&self) -> Option<&str> {
        non_blank(self.tracking_number.as_deref())
    }

    pub(crate) fn courier_whatsapp(&self) -> Option<&str> {
        non_blank(self.courier_whatsapp.as_deref())
    }

    pub(crate) fn courier_name(&self) -> Option<&str> {
        non_blank(self.courier_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
