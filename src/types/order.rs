//! # Order Record Types
//!
//! Canonical shape of an order document: identifiers, the payment-path
//! tagged status, verification and payout bookkeeping, line items and the
//! shipping address.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{catalog::ProductId, profile::BankAccount};
use crate::errors::{CommerceError, CommerceResult};

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Order identifier assigned by the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Creates a new order ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buyer (user account) identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a new user ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seller (store owner) identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(pub String);

impl SellerId {
    /// Creates a new seller ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SellerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// PAYMENT & STATUS ENUMS
// ============================================================================

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Bank transfer to the platform, verified by an admin and paid out to the seller.
    Transfer,
    /// Cash on delivery, paid to the courier or seller.
    Cod,
}

impl PaymentMethod {
    /// Stored value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Cod => "cod",
        }
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer Bank",
            Self::Cod => "COD (Bayar di Tempat)",
        }
    }
}

/// Workflow status of a bank-transfer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    /// Created, no payment proof yet.
    Pending,
    /// Proof uploaded, awaiting admin verification.
    PendingVerification,
    /// Admin approved the payment; seller payout pending.
    PaymentConfirmed,
    /// Admin rejected the proof; buyer may upload a new one.
    PendingPayment,
    /// Funds transferred to the seller; seller preparing the shipment.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the buyer.
    Delivered,
    /// Closed.
    Completed,
    /// Cancelled before shipment.
    Cancelled,
}

impl TransferStatus {
    const ALL: [Self; 9] = [
        Self::Pending,
        Self::PendingVerification,
        Self::PaymentConfirmed,
        Self::PendingPayment,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Stored value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingVerification => "pending_verification",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::PendingPayment => "pending_payment",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Workflow status of a cash-on-delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodStatus {
    /// Created, awaiting seller acceptance.
    CodConfirmed,
    /// Accepted by the seller.
    CodProcessing,
    /// Handed to the courier.
    CodShipped,
    /// Received and paid in cash.
    CodDelivered,
    /// Cancelled before shipment.
    Cancelled,
}

impl CodStatus {
    const ALL: [Self; 5] = [
        Self::CodConfirmed,
        Self::CodProcessing,
        Self::CodShipped,
        Self::CodDelivered,
        Self::Cancelled,
    ];

    /// Stored value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodConfirmed => "cod_confirmed",
            Self::CodProcessing => "cod_processing",
            Self::CodShipped => "cod_shipped",
            Self::CodDelivered => "cod_delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Order status with the payment path baked in.
///
/// Stored as two flat fields, `paymentMethod` and `status`. A stored status
/// outside the vocabulary of its payment path is kept verbatim as
/// `Unrecognized` so read paths can still show the order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawStatus", into = "RawStatus")]
pub enum OrderStatus {
    /// Bank-transfer path.
    Transfer(TransferStatus),
    /// Cash-on-delivery path.
    Cod(CodStatus),
    /// Stored value not valid for the payment path.
    Unrecognized {
        /// Payment method of the order.
        method: PaymentMethod,
        /// Stored status string.
        raw:    String,
    },
}

impl OrderStatus {
    /// Status seeded at checkout.
    #[must_use]
    pub fn initial(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Transfer => Self::Transfer(TransferStatus::Pending),
            PaymentMethod::Cod => Self::Cod(CodStatus::CodConfirmed),
        }
    }

    /// Parses a stored status for the given payment path.
    #[must_use]
    pub fn parse(method: PaymentMethod, raw: &str) -> Self {
        let parsed = match method {
            PaymentMethod::Transfer => TransferStatus::parse(raw).map(Self::Transfer),
            PaymentMethod::Cod => CodStatus::parse(raw).map(Self::Cod),
        };
        parsed.unwrap_or_else(|| Self::Unrecognized { method, raw: raw.to_string() })
    }

    /// Stored value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transfer(s) => s.as_str(),
            Self::Cod(s) => s.as_str(),
            Self::Unrecognized { raw, .. } => raw,
        }
    }

    /// Payment path of the order.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            Self::Transfer(_) => PaymentMethod::Transfer,
            Self::Cod(_) => PaymentMethod::Cod,
            Self::Unrecognized { method, .. } => *method,
        }
    }

    /// Whether the order can still be cancelled (nothing shipped yet).
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::Transfer(
                TransferStatus::Pending
                    | TransferStatus::PendingVerification
                    | TransferStatus::PendingPayment
                    | TransferStatus::PaymentConfirmed
                    | TransferStatus::Processing
            ) | Self::Cod(CodStatus::CodConfirmed | CodStatus::CodProcessing)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat stored form of [`OrderStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    payment_method: PaymentMethod,
    status:         String,
}

impl From<RawStatus> for OrderStatus {
    fn from(raw: RawStatus) -> Self {
        Self::parse(raw.payment_method, &raw.status)
    }
}

impl From<OrderStatus> for RawStatus {
    fn from(status: OrderStatus) -> Self {
        Self { payment_method: status.payment_method(), status: status.as_str().to_string() }
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment.
    #[default]
    Pending,
    /// Transfer proof uploaded.
    ProofUploaded,
    /// Transfer confirmed by an admin.
    Confirmed,
    /// Transfer proof rejected.
    Rejected,
    /// Cash to be collected on delivery.
    CodPending,
    /// Cash collected.
    Paid,
}

/// Admin verification of a transfer payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminVerificationStatus {
    /// Not verified yet.
    #[default]
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
    /// Cash-on-delivery orders skip verification.
    NotRequired,
    /// Approved (older documents).
    Verified,
}

impl AdminVerificationStatus {
    /// Whether the payment was accepted.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved | Self::Verified)
    }
}

/// Platform-to-seller payout status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerTransferStatus {
    /// Payout not made yet.
    #[default]
    Pending,
    /// Payout recorded.
    Completed,
    /// Cash-on-delivery orders have no payout.
    NotApplicable,
}

/// Seller acknowledgement of a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferVerificationStatus {
    /// Not acknowledged yet.
    #[default]
    Pending,
    /// Seller confirmed the funds arrived.
    Verified,
    /// Seller reported the funds missing.
    Rejected,
}

// ============================================================================
// LINE ITEMS & ADDRESS
// ============================================================================

/// Variant chosen for a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedVariant {
    /// Variant ID inside the product's variant list.
    pub id:   String,
    /// Variant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Line item in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product ID.
    pub product_id:       ProductId,
    /// Product name at checkout.
    pub name:             String,
    /// Product image at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image:            Option<String>,
    /// Product category at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category:         Option<String>,
    /// Unit price.
    pub price:            u64,
    /// Quantity ordered.
    pub quantity:         u32,
    /// Seller fulfilling this item.
    pub seller_id:        SellerId,
    /// Store name at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name:      Option<String>,
    /// Selected variant, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<SelectedVariant>,
}

impl LineItem {
    /// Creates a line item.
    #[must_use]
    pub fn new(
        product_id: ProductId, name: impl Into<String>, price: u64, quantity: u32,
        seller_id: SellerId,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            image: None,
            category: None,
            price,
            quantity,
            seller_id,
            seller_name: None,
            selected_variant: None,
        }
    }

    /// Attaches a selected variant.
    #[must_use]
    pub fn with_variant(mut self, id: impl Into<String>, name: Option<String>) -> Self {
        self.selected_variant = Some(SelectedVariant { id: id.into(), name });
        self
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

/// GPS position picked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub latitude:  f64,
    /// Longitude.
    pub longitude: f64,
}

/// Shipping address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    /// Recipient name.
    pub recipient:   String,
    /// Recipient phone.
    pub phone:       String,
    /// Street address.
    pub address:     String,
    /// City.
    pub city:        String,
    /// Postal code.
    pub postal_code: String,
    /// Optional GPS position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

impl ShippingAddress {
    /// Creates a shipping address.
    #[must_use]
    pub fn new(
        recipient: impl Into<String>, phone: impl Into<String>, address: impl Into<String>,
        city: impl Into<String>, postal_code: impl Into<String>,
    ) -> Self {
        Self {
            recipient:   recipient.into(),
            phone:       phone.into(),
            address:     address.into(),
            city:        city.into(),
            postal_code: postal_code.into(),
            coordinates: None,
        }
    }

    /// Checks every required field is filled in.
    pub fn validate(&self) -> CommerceResult<()> {
        let required = [
            ("recipient", &self.recipient),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("postal code", &self.postal_code),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(format!(
                "Shipping address is missing: {}",
                missing.join(", ")
            )))
        }
    }
}

// ============================================================================
// PAYOUT & STOCK BOOKKEEPING
// ============================================================================

/// Payout to one seller of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPayout {
    /// Seller receiving the funds.
    pub seller_id:           SellerId,
    /// Sum of this seller's line totals.
    pub subtotal:            u64,
    /// Share of the order's admin fee attributed to this seller.
    pub admin_fee:           u64,
    /// Amount transferred.
    pub seller_amount:       u64,
    /// Transfer receipt images.
    #[serde(default)]
    pub transfer_proofs:     Vec<String>,
    /// Bank details at the time of transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_info:         Option<BankAccount>,
    /// Whether the seller acknowledged the funds.
    #[serde(default)]
    pub is_verified:         bool,
    /// Seller acknowledgement.
    #[serde(default)]
    pub verification_status: TransferVerificationStatus,
    /// Acknowledgement time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at:         Option<DateTime<Utc>>,
}

/// Record of the platform forwarding held funds to the sellers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerTransferData {
    /// Whether more than one seller is paid.
    #[serde(default)]
    pub is_multi_seller:     bool,
    /// Payouts keyed by seller.
    pub payouts:             BTreeMap<SellerId, SellerPayout>,
    /// Sum of all payouts.
    pub seller_amount:       u64,
    /// Fee retained by the platform.
    pub admin_fee:           u64,
    /// Transfer time.
    pub transferred_at:      DateTime<Utc>,
    /// Admin who recorded the transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_by:      Option<String>,
    /// Admin notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes:               Option<String>,
    /// Whether every seller acknowledged.
    #[serde(default)]
    pub is_verified:         bool,
    /// Aggregated acknowledgement.
    #[serde(default)]
    pub verification_status: TransferVerificationStatus,
    /// Time the last acknowledgement completed verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at:         Option<DateTime<Utc>>,
}

impl SellerTransferData {
    /// Transfer proofs across all payouts.
    #[must_use]
    pub fn all_proofs(&self) -> Vec<&str> {
        self.payouts
            .values()
            .flat_map(|p| p.transfer_proofs.iter().map(String::as_str))
            .collect()
    }

    /// Recomputes the order-level acknowledgement from the payouts.
    pub fn refresh_verification(&mut self, now: DateTime<Utc>) {
        let statuses: Vec<_> = self.payouts.values().map(|p| p.verification_status).collect();

        self.verification_status = if statuses.contains(&TransferVerificationStatus::Rejected) {
            TransferVerificationStatus::Rejected
        } else if !statuses.is_empty()
            && statuses.iter().all(|s| *s == TransferVerificationStatus::Verified)
        {
            TransferVerificationStatus::Verified
        } else {
            TransferVerificationStatus::Pending
        };

        self.is_verified = self.verification_status == TransferVerificationStatus::Verified;
        self.verified_at = self.is_verified.then_some(now);
    }
}

/// Audit entry of one stock decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReduction {
    /// Product adjusted.
    pub product_id: ProductId,
    /// Variant adjusted, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Stock before.
    pub old_stock:  u32,
    /// Stock after.
    pub new_stock:  u32,
    /// Quantity ordered.
    pub quantity:   u32,
}

// ============================================================================
// HISTORY
// ============================================================================

/// Lifecycle action recorded in the order history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// Buyer checked out.
    Created,
    /// Buyer uploaded a transfer proof.
    PaymentProofSubmitted,
    /// Admin approved the payment.
    PaymentApproved,
    /// Admin rejected the payment.
    PaymentRejected,
    /// Admin paid out the sellers.
    SellerTransferred,
    /// Seller acknowledged the payout.
    TransferReceiptVerified,
    /// Seller accepted a cash-on-delivery order.
    CodAccepted,
    /// Stock decremented.
    StockReduced,
    /// Seller shipped.
    Shipped,
    /// Goods received.
    Delivered,
    /// Order closed.
    Completed,
    /// Order cancelled.
    Cancelled,
}

impl OrderAction {
    /// Verb used in error messages.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Created => "be created",
            Self::PaymentProofSubmitted => "accept a payment proof",
            Self::PaymentApproved => "approve payment",
            Self::PaymentRejected => "reject payment",
            Self::SellerTransferred => "record a seller transfer",
            Self::TransferReceiptVerified => "verify transfer receipt",
            Self::CodAccepted => "accept the COD order",
            Self::StockReduced => "reduce stock",
            Self::Shipped => "ship",
            Self::Delivered => "confirm delivery",
            Self::Completed => "complete",
            Self::Cancelled => "cancel",
        }
    }
}

/// Order history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEvent {
    /// Action taken.
    pub action: OrderAction,
    /// Status before.
    pub from:   String,
    /// Status after.
    pub to:     String,
    /// Who acted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor:  Option<String>,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note:   Option<String>,
    /// When.
    pub at:     DateTime<Utc>,
}

// ============================================================================
// ORDER
// ============================================================================

/// Complete order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID (document id, not stored in the body).
    #[serde(default, skip_serializing)]
    pub id:                        OrderId,
    /// Human-readable order number.
    #[serde(default)]
    pub order_number:              String,
    /// Buyer.
    pub user_id:                   UserId,
    /// Line items.
    pub items:                     Vec<LineItem>,
    /// Sum of line totals.
    pub subtotal:                  u64,
    /// Platform fee; zero for cash on delivery.
    pub admin_fee:                 u64,
    /// Subtotal plus admin fee.
    pub total_amount:              u64,
    /// Payment method and workflow status.
    #[serde(flatten)]
    pub status:                    OrderStatus,
    /// Payment status.
    #[serde(default)]
    pub payment_status:            PaymentStatus,
    /// Transfer proof image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof:             Option<String>,
    /// Proof upload time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof_uploaded_at: Option<DateTime<Utc>>,
    /// Admin verification.
    #[serde(default)]
    pub admin_verification_status: AdminVerificationStatus,
    /// Admin verification notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes:               Option<String>,
    /// Admin who verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by:               Option<String>,
    /// Verification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at:               Option<DateTime<Utc>>,
    /// Seller payout status.
    #[serde(default)]
    pub seller_transfer_status:    SellerTransferStatus,
    /// Seller payout record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_transfer_data:      Option<SellerTransferData>,
    /// Shipping address.
    pub shipping_address:          ShippingAddress,
    /// Courier tracking number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number:           Option<String>,
    /// Courier WhatsApp contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_whatsapp:          Option<String>,
    /// Courier name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_name:              Option<String>,
    /// Shipment time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at:                Option<DateTime<Utc>>,
    /// Delivery time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at:              Option<DateTime<Utc>>,
    /// Completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at:              Option<DateTime<Utc>>,
    /// Cancellation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at:              Option<DateTime<Utc>>,
    /// Cancellation reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason:             Option<String>,
    /// Buyer notes at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes:                     Option<String>,
    /// Whether stock was already decremented for this order.
    #[serde(default)]
    pub stock_reduced:             bool,
    /// Stock decrement audit.
    #[serde(default)]
    pub stock_reductions:          Vec<StockReduction>,
    /// Lifecycle history.
    #[serde(default)]
    pub history:                   Vec<OrderHistoryEvent>,
    /// Optimistic-concurrency counter.
    #[serde(default)]
    pub version:                   u64,
    /// Creation time (server clock).
    #[serde(default)]
    pub created_at:                DateTime<Utc>,
    /// Last update time (server clock).
    #[serde(default)]
    pub updated_at:                DateTime<Utc>,
}

impl Order {
    /// Payment path.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.status.payment_method()
    }

    /// Whether the order is cash on delivery.
    #[must_use]
    pub fn is_cod(&self) -> bool {
        self.payment_method() == PaymentMethod::Cod
    }

    /// Distinct sellers, in first-seen order.
    #[must_use]
    pub fn seller_ids(&self) -> Vec<&SellerId> {
        let mut sellers: Vec<&SellerId> = Vec::new();
        for item in &self.items {
            if !sellers.contains(&&item.seller_id) {
                sellers.push(&item.seller_id);
            }
        }
        sellers
    }

    /// Whether items come from more than one seller.
    #[must_use]
    pub fn is_multi_seller(&self) -> bool {
        self.seller_ids().len() > 1
    }

    /// Whether the seller has at least one item in the order.
    #[must_use]
    pub fn has_seller(&self, seller_id: &SellerId) -> bool {
        self.items.iter().any(|i| &i.seller_id == seller_id)
    }

    /// Items fulfilled by one seller.
    pub fn items_for_seller<'a>(
        &'a self, seller_id: &'a SellerId,
    ) -> impl Iterator<Item = &'a LineItem> + 'a {
        self.items.iter().filter(move |i| &i.seller_id == seller_id)
    }

    /// Sum of one seller's line totals.
    #[must_use]
    pub fn seller_subtotal(&self, seller_id: &SellerId) -> u64 {
        self.items_for_seller(seller_id).map(LineItem::line_total).fold(0, u64::saturating_add)
    }
}
