//! Error types for the storefront order engine

use serde::Serialize;
use tracing::{error, warn};

use crate::store::StoreError;

/// Commerce-specific errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommerceError {
    /// Input rejected before any write.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    /// The order's current status does not allow the requested action.
    #[error("Order {order_id} cannot {action} while in status '{status}'")]
    InvalidTransition {
        /// Order ID.
        order_id: String,
        /// Raw status at the time of the attempt.
        status:   String,
        /// Attempted action.
        action:   &'static str,
    },
    /// The action only applies to one payment path.
    #[error("Order {order_id} uses payment method '{actual}', action requires '{expected}'")]
    PaymentMethodMismatch {
        /// Order ID.
        order_id: String,
        /// Payment method the action requires.
        expected: &'static str,
        /// Payment method of the order.
        actual:   &'static str,
    },
    /// The seller has no items in the order.
    #[error("Seller {seller_id} has no items in order {order_id}")]
    NotOrderSeller {
        /// Order ID.
        order_id:  String,
        /// Seller ID.
        seller_id: String,
    },
    /// Another writer updated the order first.
    #[error("Order {order_id} was modified concurrently: expected version {expected}, found {found}")]
    ConcurrentModification {
        /// Order ID.
        order_id: String,
        /// Version read before the transition.
        expected: u64,
        /// Version found at commit time.
        found:    u64,
    },
    /// Document store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// Document could not be converted to or from its canonical shape.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CommerceError {
    /// Whether the error was raised before anything was written.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidTransition { .. }
                | Self::PaymentMethodMismatch { .. }
                | Self::NotOrderSeller { .. }
        )
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. }
                | Self::Store(StoreError::Unavailable(_) | StoreError::VersionConflict { .. })
        )
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CommerceError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for commerce operations.
pub type CommerceResult<T> = Result<T, CommerceError>;

/// Result shape handed to the presentation layer.
///
/// Carries either a payload or a human-readable error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data:    Option<T>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:   Option<String>,
}

impl<T> ActionResult<T> {
    /// Successful result.
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    /// Failed result.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }

    /// Converts back into a `Result`, using the message as the error.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| "Unknown error".to_string())),
        }
    }
}

impl<T> From<CommerceResult<T>> for ActionResult<T> {
    fn from(result: CommerceResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                if err.is_validation() {
                    warn!(error = %err, "Storefront action rejected");
                } else {
                    error!(error = %err, "Storefront action failed");
                }
                Self::failed(err.to_string())
            },
        }
    }
}
