use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use capital_types::{Caller, MemberId, Money};

/// Which ledger record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Member,
    Investment,
    WithdrawalRequest,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Member => "member",
            EntityKind::Investment => "investment",
            EntityKind::WithdrawalRequest => "withdrawal request",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input the caller can correct. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("{kind} {id} is already {status}; only pending records can be decided")]
    InvalidTransition {
        kind: EntityKind,
        id: i64,
        status: &'static str,
    },

    #[error("member {member} has {available} capital; cannot withdraw {requested}")]
    InsufficientBalance {
        member: MemberId,
        available: Money,
        requested: Money,
    },

    #[error("{operation} requires an administrator")]
    Forbidden { operation: &'static str },

    /// Applying a delta would leave a stored balance outside the i64 minor
    /// unit range. Nothing was written.
    #[error("{balance} of member {member} cannot absorb {delta}")]
    BalanceOverflow {
        member: MemberId,
        balance: &'static str,
        delta: Money,
    },

    /// Stored records contradict each other (e.g. an investment whose owner
    /// is gone). Never caused by caller input.
    #[error("ledger integrity violation: {0}")]
    Integrity(String),

    #[error("ledger storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("cannot prepare ledger file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LedgerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// True for errors the request layer should report as a client error.
    /// `Integrity`, `BalanceOverflow`, `Storage` and `File` are server faults.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::InvalidTransition { .. }
                | Self::InsufficientBalance { .. }
                | Self::Forbidden { .. }
        )
    }
}

/// Fail with `Forbidden` unless the caller is `member` or an administrator.
pub(crate) fn require_self_or_admin(
    caller: Caller,
    member: MemberId,
    operation: &'static str,
) -> Result<(), LedgerError> {
    if caller.is_admin() || caller.member_id() == member {
        return Ok(());
    }
    tracing::warn!(
        caller = %caller.member_id(),
        member = %member,
        operation,
        "Rejected read of another member's records"
    );
    Err(LedgerError::Forbidden { operation })
}

/// Fail with `Forbidden` unless the caller carries the administrator flag.
pub(crate) fn require_admin(caller: Caller, operation: &'static str) -> Result<(), LedgerError> {
    if caller.is_admin() {
        return Ok(());
    }
    tracing::warn!(caller = %caller.member_id(), operation, "Rejected non-admin caller");
    Err(LedgerError::Forbidden { operation })
}
