//! Lifecycle states and administrator decisions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    InvestmentStatus,
    WithdrawalStatus,
    JoinStatus,
    InvestmentDecision,
    WithdrawalDecision,
}

impl EnumKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EnumKind::InvestmentStatus => "investment status",
            EnumKind::WithdrawalStatus => "withdrawal status",
            EnumKind::JoinStatus => "join status",
            EnumKind::InvestmentDecision => "investment decision",
            EnumKind::WithdrawalDecision => "withdrawal decision",
        }
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value '{raw}'; expected one of: {expected:?}")]
pub struct EnumParseError {
    kind: EnumKind,
    raw: String,
    expected: &'static [&'static str],
}

impl EnumParseError {
    #[must_use]
    pub fn new(kind: EnumKind, raw: impl Into<String>, expected: &'static [&'static str]) -> Self {
        Self {
            kind,
            raw: raw.into(),
            expected,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EnumKind {
        self.kind
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

// ============================================================================
// Investment
// ============================================================================

/// Investment lifecycle. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

const INVESTMENT_STATUS_VALUES: &[&str] = &["pending", "accepted", "rejected"];

impl InvestmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            InvestmentStatus::Pending => "pending",
            InvestmentStatus::Accepted => "accepted",
            InvestmentStatus::Rejected => "rejected",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, InvestmentStatus::Pending)
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(InvestmentStatus::Pending),
            "accepted" => Ok(InvestmentStatus::Accepted),
            "rejected" => Ok(InvestmentStatus::Rejected),
            _ => Err(EnumParseError::new(
                EnumKind::InvestmentStatus,
                s.trim(),
                INVESTMENT_STATUS_VALUES,
            )),
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvestmentDecision {
    Accept,
    Reject,
}

const INVESTMENT_DECISION_VALUES: &[&str] = &["accept", "approve", "reject"];

impl InvestmentDecision {
    /// Status the investment ends up in after this decision.
    #[must_use]
    pub const fn target(self) -> InvestmentStatus {
        match self {
            InvestmentDecision::Accept => InvestmentStatus::Accepted,
            InvestmentDecision::Reject => InvestmentStatus::Rejected,
        }
    }

    /// Accepts "approve" as an alias, matching the admin action vocabulary.
    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" | "approve" => Ok(InvestmentDecision::Accept),
            "reject" => Ok(InvestmentDecision::Reject),
            _ => Err(EnumParseError::new(
                EnumKind::InvestmentDecision,
                s.trim(),
                INVESTMENT_DECISION_VALUES,
            )),
        }
    }
}

// ============================================================================
// Withdrawal
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

const WITHDRAWAL_STATUS_VALUES: &[&str] = &["pending", "approved", "rejected"];

impl WithdrawalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(EnumParseError::new(
                EnumKind::WithdrawalStatus,
                s.trim(),
                WITHDRAWAL_STATUS_VALUES,
            )),
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithdrawalDecision {
    Approve,
    Reject,
}

const WITHDRAWAL_DECISION_VALUES: &[&str] = &["approve", "reject"];

impl WithdrawalDecision {
    #[must_use]
    pub const fn target(self) -> WithdrawalStatus {
        match self {
            WithdrawalDecision::Approve => WithdrawalStatus::Approved,
            WithdrawalDecision::Reject => WithdrawalStatus::Rejected,
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(WithdrawalDecision::Approve),
            "reject" => Ok(WithdrawalDecision::Reject),
            _ => Err(EnumParseError::new(
                EnumKind::WithdrawalDecision,
                s.trim(),
                WITHDRAWAL_DECISION_VALUES,
            )),
        }
    }
}

// ============================================================================
// Membership
// ============================================================================

/// Administrative review state of a member's join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

const JOIN_STATUS_VALUES: &[&str] = &["pending", "approved", "rejected"];

impl JoinStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            JoinStatus::Pending => "pending",
            JoinStatus::Approved => "approved",
            JoinStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JoinStatus::Pending),
            "approved" => Ok(JoinStatus::Approved),
            "rejected" => Ok(JoinStatus::Rejected),
            _ => Err(EnumParseError::new(
                EnumKind::JoinStatus,
                s.trim(),
                JOIN_STATUS_VALUES,
            )),
        }
    }
}

impl fmt::Display for JoinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
