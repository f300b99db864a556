//! Durable ledger records.
//!
//! These are plain snapshots of committed rows. Balances on [`Member`] change
//! only through the ledger's lifecycle and accrual operations, so the structs
//! expose no mutators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    InvestmentId, InvestmentStatus, JoinStatus, MemberId, Money, Percentage, WithdrawalId,
    WithdrawalStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub join_status: JoinStatus,
    pub is_admin: bool,
    /// Approved investments minus approved withdrawals.
    pub total_capital: Money,
    /// Administrator-accrued returns, corrections included.
    pub total_returns: Money,
    pub created_at: DateTime<Utc>,
}

impl Member {
    #[must_use]
    pub fn percentage_gain_loss(&self) -> Percentage {
        Percentage::gain_loss(self.total_capital, self.total_returns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub owner_id: MemberId,
    pub amount: Money,
    /// Informational per-investment figure maintained by administrators.
    /// Never summed into [`Member::total_returns`].
    pub generated_returns: Money,
    pub status: InvestmentStatus,
    /// Opaque evidence reference, stored verbatim.
    pub proof_reference: String,
    pub invested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub owner_id: MemberId,
    pub amount: Money,
    pub status: WithdrawalStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
