//! # Status Projection
//!
//! One decision table turns the raw order fields (status, admin verification
//! and seller transfer) into a [`FulfilmentStage`]. The seller view and the
//! admin transaction view both read their status from it, so the two can
//! never disagree about where an order is.
//!
//! Presentation (label, colour, icon) is looked up per status code.

use serde::Serialize;
use tracing::warn;

use crate::types::{
    AdminVerificationStatus, CodStatus, Order, OrderStatus, SellerTransferStatus, TransferStatus,
};


/// Label shown for a status code outside the known vocabulary.
pub const UNKNOWN_STATUS_LABEL: &str = "Status Tidak Dikenal";

// ============================================================================
// DECISION TABLE
// ============================================================================

/// Where an order stands, independent of who is looking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfilmentStage {
    /// Transfer order without a payment proof.
    AwaitingPayment,
    /// Proof uploaded (transfer) or order placed (COD), awaiting the next actor.
    AwaitingVerification,
    /// Admin rejected the payment proof.
    PaymentRejected,
    /// Payment approved, platform has not paid the seller yet.
    AwaitingSellerTransfer,
    /// Seller preparing the shipment.
    Processing,
    /// With the courier.
    Shipped,
    /// Received by the buyer.
    Delivered,
    /// Closed.
    Completed,
    /// Cancelled.
    Cancelled,
    /// Stored status outside the vocabulary of its payment path.
    Unrecognized(String),
}

impl FulfilmentStage {
    /// Whether the goods already left the seller.
    #[must_use]
    pub fn is_shipped_or_later(&self) -> bool {
        matches!(self, Self::Shipped | Self::Delivered | Self::Completed)
    }
}

/// Derives the fulfilment stage from the raw order fields.
///
/// A transfer order whose raw status already says processing, shipped,
/// delivered, completed or cancelled keeps that stage even when the
/// verification bookkeeping lags behind.
#[must_use]
pub fn derive_stage(order: &Order) -> FulfilmentStage {
    match &order.status {
        OrderStatus::Cod(status) => match status {
            CodStatus::CodConfirmed => FulfilmentStage::AwaitingVerification,
            CodStatus::CodProcessing => FulfilmentStage::Processing,
            CodStatus::CodShipped => FulfilmentStage::Shipped,
            CodStatus::CodDelivered => FulfilmentStage::Delivered,
            CodStatus::Cancelled => FulfilmentStage::Cancelled,
        },
        OrderStatus::Transfer(status) => match status {
            TransferStatus::Processing => FulfilmentStage::Processing,
            TransferStatus::Shipped => FulfilmentStage::Shipped,
            TransferStatus::Delivered => FulfilmentStage::Delivered,
            TransferStatus::Completed => FulfilmentStage::Completed,
            TransferStatus::Cancelled => FulfilmentStage::Cancelled,
            TransferStatus::Pending
            | TransferStatus::PendingVerification
            | TransferStatus::PaymentConfirmed
            | TransferStatus::PendingPayment => stage_from_verification(order, *status),
        },
        OrderStatus::Unrecognized { raw, .. } => FulfilmentStage::Unrecognized(raw.clone()),
    }
}

fn stage_from_verification(order: &Order, status: TransferStatus) -> FulfilmentStage {
    match order.admin_verification_status {
        AdminVerificationStatus::Rejected => FulfilmentStage::PaymentRejected,
        AdminVerificationStatus::Approved | AdminVerificationStatus::Verified => {
            if order.seller_transfer_status == SellerTransferStatus::Completed {
                FulfilmentStage::Processing
            } else {
                FulfilmentStage::AwaitingSellerTransfer
            }
        },
        AdminVerificationStatus::Pending | AdminVerificationStatus::NotRequired => {
            if status == TransferStatus::Pending {
                FulfilmentStage::AwaitingPayment
            } else {
                FulfilmentStage::AwaitingVerification
            }
        },
    }
}

// ============================================================================
// PRESENTATION
// ============================================================================

/// Label, colour and icon for one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    /// Human-readable label.
    pub label: &'static str,
    /// Hex colour.
    pub color: &'static str,
    /// Icon name.
    pub icon:  &'static str,
}

const fn presentation(
    label: &'static str, color: &'static str, icon: &'static str,
) -> StatusPresentation {
    StatusPresentation { label, color, icon }
}

const UNKNOWN: StatusPresentation =
    presentation(UNKNOWN_STATUS_LABEL, "#9E9E9E", "help-circle-outline");

const STATUS_TABLE: &[(&str, StatusPresentation)] = &[
    ("pending", presentation("Menunggu Pembayaran", "#FFA500", "time-outline")),
    (
        "pending_verification",
        presentation("Menunggu Verifikasi Admin", "#FF9800", "hourglass-outline"),
    ),
    (
        "payment_confirmed",
        presentation("Pembayaran Dikonfirmasi", "#2196F3", "checkmark-circle-outline"),
    ),
    (
        "pending_payment",
        presentation("Pembayaran Ditolak - Upload Ulang", "#F44336", "alert-circle-outline"),
    ),
    ("waiting_transfer", presentation("Menunggu Transfer Dana", "#9C27B0", "wallet-outline")),
    ("processing", presentation("Diproses", "#2196F3", "cube-outline")),
    ("shipped", presentation("Dikirim", "#3F51B5", "car-outline")),
    ("delivered", presentation("Diterima", "#4CAF50", "checkmark-done-outline")),
    ("completed", presentation("Selesai", "#4CAF50", "checkmark-done-circle-outline")),
    ("cancelled", presentation("Dibatalkan", "#F44336", "close-circle-outline")),
    ("cod_confirmed", presentation("COD - Pesanan Dikonfirmasi", "#FF9800", "cash-outline")),
    ("cod_processing", presentation("COD - Sedang Diproses", "#2196F3", "cube-outline")),
    ("cod_shipped", presentation("COD - Dalam Pengiriman", "#3F51B5", "car-outline")),
    (
        "cod_delivered",
        presentation("COD - Barang Diterima & Dibayar", "#4CAF50", "checkmark-done-outline"),
    ),
];

/// Looks up the presentation of a status code.
///
/// Unknown codes get the "Status Tidak Dikenal" entry and a warning.
#[must_use]
pub fn status_presentation(code: &str) -> StatusPresentation {
    STATUS_TABLE.iter().find(|(known, _)| *known == code).map_or_else(
        || {
            warn!(status = code, "Unknown order status, using fallback label");
            UNKNOWN
        },
        |(_, p)| *p,
    )
}

/// Label for a status code.
#[must_use]
pub fn status_label(code: &str) -> &'static str {
    status_presentation(code).label
}
