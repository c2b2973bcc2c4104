//! # Seller Orders
//!
//! Seller-facing read model. A seller sees only their own items of an order,
//! a subtotal over those items and a status derived from the shared
//! fulfilment stage.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::status_projection::FulfilmentStage;
use crate::{
    config::CommerceConfig,
    store::DocumentStore,
    types::{
        OrderId, PaymentMethod, ProductId, SelectedVariant, SellerPayout, ShippingAddress, UserId,
    },
};

mod service;

#[cfg(test)]
mod tests;

pub use service::project_seller_order;

/// Status as the seller sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SellerStatus {
    /// Waiting for the payment to be verified (or, for COD, for the seller to accept).
    PendingVerification,
    /// Payment verified, platform payout pending.
    WaitingTransfer,
    /// Ready to prepare and ship.
    Processing,
    /// With the courier.
    Shipped,
    /// Received by the buyer.
    Delivered,
    /// Closed.
    Completed,
    /// Cancelled or payment rejected.
    Cancelled,
    /// Raw status outside the known vocabulary.
    Unknown(String),
}

impl SellerStatus {
    /// Maps the shared fulfilment stage to the seller vocabulary.
    #[must_use]
    pub fn from_stage(stage: &FulfilmentStage) -> Self {
        match stage {
            FulfilmentStage::AwaitingPayment | FulfilmentStage::AwaitingVerification => {
                Self::PendingVerification
            },
            FulfilmentStage::AwaitingSellerTransfer => Self::WaitingTransfer,
            FulfilmentStage::Processing => Self::Processing,
            FulfilmentStage::Shipped => Self::Shipped,
            FulfilmentStage::Delivered => Self::Delivered,
            FulfilmentStage::Completed => Self::Completed,
            FulfilmentStage::PaymentRejected | FulfilmentStage::Cancelled => Self::Cancelled,
            FulfilmentStage::Unrecognized(raw) => Self::Unknown(raw.clone()),
        }
    }

    /// Status code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingVerification => "pending_verification",
            Self::WaitingTransfer => "waiting_transfer",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the seller earned the order's revenue.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Delivered | Self::Completed)
    }
}

impl Serialize for SellerStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One of the seller's line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderItem {
    /// Product ID.
    pub product_id:       ProductId,
    /// Product name (live when available).
    pub name:             String,
    /// Product image (live when available).
    pub image:            Option<String>,
    /// Product category (live when available).
    pub category:         Option<String>,
    /// Unit price at checkout.
    pub price:            u64,
    /// Quantity ordered.
    pub quantity:         u32,
    /// Price times quantity.
    pub line_total:       u64,
    /// Selected variant.
    pub selected_variant: Option<SelectedVariant>,
}

/// Buyer identity shown to the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSnapshot {
    /// Buyer ID.
    pub user_id: UserId,
    /// Name.
    pub name:    String,
    /// Phone.
    pub phone:   Option<String>,
    /// Avatar.
    pub avatar:  Option<String>,
}

/// Order as one seller sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderView {
    /// Order ID.
    pub order_id:         OrderId,
    /// Order number.
    pub order_number:     String,
    /// Payment method.
    pub payment_method:   PaymentMethod,
    /// Seller-facing status.
    pub status:           SellerStatus,
    /// Stored status.
    pub raw_status:       String,
    /// Status label.
    pub status_label:     &'static str,
    /// Status colour.
    pub status_color:     &'static str,
    /// Status icon.
    pub status_icon:      &'static str,
    /// The seller's items only.
    pub items:            Vec<SellerOrderItem>,
    /// Sum of the seller's line totals.
    pub subtotal:         u64,
    /// Units across the seller's items.
    pub item_count:       u32,
    /// Buyer identity.
    pub buyer:            BuyerSnapshot,
    /// Shipping address.
    pub shipping_address: ShippingAddress,
    /// Tracking number, once shipped.
    pub tracking_number:  Option<String>,
    /// Courier WhatsApp, once shipped.
    pub courier_whatsapp: Option<String>,
    /// This seller's payout, once transferred.
    pub payout:           Option<SellerPayout>,
    /// Created.
    pub created_at:       DateTime<Utc>,
    /// Last updated.
    pub updated_at:       DateTime<Utc>,
}

/// Counters over a seller's orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderSummary {
    /// Orders containing the seller's items.
    pub total_orders:    usize,
    /// Orders per seller-facing status code.
    pub by_status:       BTreeMap<String, usize>,
    /// Seller subtotal over delivered and completed orders.
    pub revenue:         u64,
    /// Orders the seller has to act on (accept or ship).
    pub awaiting_action: usize,
}

/// Seller order listing service.
#[derive(Clone)]
pub struct SellerOrderService {
    /// Backing document store.
    store:  Arc<dyn DocumentStore>,
    /// Engine configuration.
    config: CommerceConfig,
}

impl std::fmt::Debug for SellerOrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellerOrderService").field("config", &self.config).finish_non_exhaustive()
    }
}
