//! Read-only reconciliation views.
//!
//! Nothing here writes. Multi-read views run inside a deferred transaction so
//! they observe one committed snapshot.

use rusqlite::{Connection, params};
use serde::Serialize;

use capital_types::{
    AggregationScope, Caller, Investment, InvestmentStatus, Member, MemberId, Money, Percentage,
    WithdrawalRequest,
};

use crate::error::{EntityKind, LedgerError, require_self_or_admin};
use crate::store::{
    INVESTMENT_COLUMNS, Ledger, WITHDRAWAL_COLUMNS, investment_from_row, load_member,
    withdrawal_from_row,
};

/// Gain or loss of a member's accrued returns relative to their capital.
///
/// Zero when there is no capital, and zero when there is capital but no
/// returns; otherwise `returns / capital × 100` to two places.
#[must_use]
pub fn percentage_gain_loss(member: &Member) -> Percentage {
    member.percentage_gain_loss()
}

/// Sums over investment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformTotals {
    pub scope: AggregationScope,
    pub total_invested: Money,
    pub total_generated_returns: Money,
}

/// Platform-wide dashboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub total_members: u64,
    pub active_members: u64,
    pub totals: PlatformTotals,
    pub total_withdrawal_requests: u64,
}

/// Everything recorded for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStatement {
    pub member: Member,
    pub investments: Vec<Investment>,
    pub withdrawals: Vec<WithdrawalRequest>,
    pub percentage_gain_loss: Percentage,
}

/// A member's accepted investments alongside their running balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedInvestments {
    pub investments: Vec<Investment>,
    pub total_capital: Money,
    pub total_returns: Money,
}

fn platform_totals_in(
    db: &Connection,
    scope: AggregationScope,
) -> rusqlite::Result<PlatformTotals> {
    let status_filter = match scope {
        AggregationScope::AllStatuses => None,
        AggregationScope::AcceptedOnly => Some(InvestmentStatus::Accepted.as_str()),
    };
    let (invested, generated): (i64, i64) = db.query_row(
        "SELECT COALESCE(SUM(amount), 0), COALESCE(SUM(generated_returns), 0)
         FROM investments
         WHERE ?1 IS NULL OR status = ?1",
        params![status_filter],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(PlatformTotals {
        scope,
        total_invested: Money::from_minor(invested),
        total_generated_returns: Money::from_minor(generated),
    })
}

fn count(db: &Connection, sql: &str) -> rusqlite::Result<u64> {
    let n: i64 = db.query_row(sql, [], |row| row.get(0))?;
    Ok(u64::try_from(n).unwrap_or_default())
}

impl Ledger {
    /// Totals under the configured aggregation scope.
    pub fn platform_totals(&self) -> Result<PlatformTotals, LedgerError> {
        self.platform_totals_with_scope(self.options().aggregation_scope)
    }

    pub fn platform_totals_with_scope(
        &self,
        scope: AggregationScope,
    ) -> Result<PlatformTotals, LedgerError> {
        Ok(platform_totals_in(&self.db, scope)?)
    }

    /// Distinct owners appearing on any investment, whatever its status.
    pub fn active_member_count(&self) -> Result<u64, LedgerError> {
        Ok(count(
            &self.db,
            "SELECT COUNT(DISTINCT owner_id) FROM investments",
        )?)
    }

    pub fn analytics(&self) -> Result<Analytics, LedgerError> {
        let tx = self.db.unchecked_transaction()?;
        let analytics = Analytics {
            total_members: count(&tx, "SELECT COUNT(*) FROM members")?,
            active_members: count(&tx, "SELECT COUNT(DISTINCT owner_id) FROM investments")?,
            totals: platform_totals_in(&tx, self.options().aggregation_scope)?,
            total_withdrawal_requests: count(&tx, "SELECT COUNT(*) FROM withdrawals")?,
        };
        tx.finish()?;
        Ok(analytics)
    }

    /// The member with every investment and withdrawal request they own.
    ///
    /// Only the member themselves or an administrator may read it.
    pub fn statement(
        &self,
        caller: Caller,
        member: MemberId,
    ) -> Result<MemberStatement, LedgerError> {
        require_self_or_admin(caller, member, "member statement")?;

        let tx = self.db.unchecked_transaction()?;

        let record = load_member(&tx, member)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Member, member.value()))?;

        let investments = tx
            .prepare(&format!(
                "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE owner_id = ?1 ORDER BY id ASC"
            ))?
            .query_map([member.value()], investment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let withdrawals = tx
            .prepare(&format!(
                "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE owner_id = ?1 ORDER BY id ASC"
            ))?
            .query_map([member.value()], withdrawal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tx.finish()?;

        Ok(MemberStatement {
            percentage_gain_loss: percentage_gain_loss(&record),
            member: record,
            investments,
            withdrawals,
        })
    }

    /// Accepted investments and balances, read from one snapshot.
    pub fn accepted_investments(
        &self,
        caller: Caller,
        member: MemberId,
    ) -> Result<AcceptedInvestments, LedgerError> {
        require_self_or_admin(caller, member, "accepted investments")?;

        let tx = self.db.unchecked_transaction()?;
        let record = load_member(&tx, member)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Member, member.value()))?;
        let investments = tx
            .prepare(&format!(
                "SELECT {INVESTMENT_COLUMNS} FROM investments
                 WHERE owner_id = ?1 AND status = ?2
                 ORDER BY id ASC"
            ))?
            .query_map(
                params![member.value(), InvestmentStatus::Accepted.as_str()],
                investment_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tx.finish()?;

        Ok(AcceptedInvestments {
            investments,
            total_capital: record.total_capital,
            total_returns: record.total_returns,
        })
    }
}
