//! # Order Lifecycle
//!
//! Checkout and every status transition of an order, on both payment paths:
//!
//! ```text
//! transfer: pending -> pending_verification -> payment_confirmed -> processing
//!           -> shipped -> delivered -> completed
//!           (reject: pending_verification -> pending_payment -> pending_verification)
//! cod:      cod_confirmed -> cod_processing -> cod_shipped -> cod_delivered
//! ```
//!
//! Any pre-shipment status can move to `cancelled`.

use std::sync::Arc;

use crate::{
    config::CommerceConfig, implementation::inventory_adjustment::InventoryAdjuster,
    store::DocumentStore,
};

mod payouts;
mod requests;
mod service;
mod transitions;

#[cfg(test)]
mod tests;

pub use payouts::{build_transfer_data, split_admin_fee};
pub use requests::{
    CheckoutRequest, PaymentDecision, PayoutInstruction, SellerTransferRequest, ShipmentDetails,
};
pub use transitions::order_number;

/// Order lifecycle service.
#[derive(Clone)]
pub struct OrderService {
    /// Backing document store.
    store:     Arc<dyn DocumentStore>,
    /// Engine configuration.
    config:    CommerceConfig,
    /// Stock decrement staging.
    inventory: InventoryAdjuster,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService").field("config", &self.config).finish_non_exhaustive()
    }
}
