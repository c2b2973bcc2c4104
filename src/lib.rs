//! # Storefront Orders
//!
//! Order lifecycle and escrow-style payout engine for a multi-seller
//! storefront backed by a document store. Bank-transfer orders pass through
//! admin verification and a platform-to-seller payout; cash-on-delivery
//! orders go straight from the seller to the buyer.

#![allow(clippy::unnecessary_literal_bound)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::unnecessary_sort_by)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod errors;
pub mod implementation;
pub mod store;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for public API
pub use config::CommerceConfig;
pub use errors::{ActionResult, CommerceError, CommerceResult};
pub use implementation::{OrderService, SellerOrderService, StorefrontActions, TransactionService};
pub use store::{DocumentStore, InMemoryDocumentStore};
pub use telemetry::init_tracing;
