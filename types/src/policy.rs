//! Ledger policy switches selected through configuration.

use serde::{Deserialize, Serialize};

/// Whether withdrawal approval checks the owner's current capital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalPolicy {
    /// Approve regardless of balance; capital may go negative.
    #[default]
    Permissive,
    /// Refuse approval when capital is below the requested amount.
    Strict,
}

impl WithdrawalPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }
}

/// Which investments contribute to platform-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationScope {
    /// Every investment record, pending and rejected included.
    #[default]
    AllStatuses,
    AcceptedOnly,
}

impl AggregationScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllStatuses => "all_statuses",
            Self::AcceptedOnly => "accepted_only",
        }
    }
}
