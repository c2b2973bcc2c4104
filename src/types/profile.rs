//! User profile types.

use serde::{Deserialize, Serialize};

/// Fallback display name when a profile has none.
pub const UNKNOWN_USER_NAME: &str = "Pengguna";

/// Bank account a seller receives payouts on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankAccount {
    /// Bank name.
    pub bank_name:      String,
    /// Account number.
    pub account_number: String,
    /// Account holder.
    pub account_holder: String,
}

impl BankAccount {
    /// Whether the account can receive a transfer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.bank_name.trim().is_empty() && !self.account_number.trim().is_empty()
    }
}

/// User profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name:         Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone:        Option<String>,
    /// Avatar image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar:       Option<String>,
    /// Store name, for sellers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name:   Option<String>,
    /// Payout bank account, for sellers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<BankAccount>,
}

impl UserProfile {
    /// Best name to show for the user.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.store_name.as_deref().filter(|n| !n.trim().is_empty()))
    }

    /// Best name to show for the user's store.
    #[must_use]
    pub fn store_display_name(&self) -> Option<&str> {
        self.store_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.display_name())
    }
}
