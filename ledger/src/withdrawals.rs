//! Withdrawal lifecycle manager.
//!
//! Mirrors the investment lifecycle with a debit instead of a credit. Whether
//! an approval may take capital below zero is decided by the configured
//! [`WithdrawalPolicy`].

use chrono::Utc;
use rusqlite::{TransactionBehavior, params};

use capital_types::{
    Caller, MemberId, Money, WithdrawalDecision, WithdrawalId, WithdrawalPolicy,
    WithdrawalRequest, WithdrawalStatus,
};

use crate::error::{EntityKind, LedgerError, require_admin};
use crate::store::{
    Balance, BalanceUpdate, Ledger, WITHDRAWAL_COLUMNS, adjust_balance, load_withdrawal,
    member_exists, withdrawal_from_row,
};

impl Ledger {
    /// File a pending withdrawal request. Capital is untouched until approval.
    pub fn request_withdrawal(
        &mut self,
        owner: MemberId,
        amount: Money,
    ) -> Result<WithdrawalRequest, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "withdrawal amount must be positive (got {amount})"
            )));
        }

        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !member_exists(&tx, owner)? {
            return Err(LedgerError::validation(format!(
                "member {owner} does not exist"
            )));
        }

        tx.execute(
            "INSERT INTO withdrawals (owner_id, amount, status, requested_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                owner.value(),
                amount.minor_units(),
                WithdrawalStatus::Pending.as_str(),
                Utc::now()
            ],
        )?;
        let id = WithdrawalId::new(tx.last_insert_rowid());
        let request = load_withdrawal(&tx, id)?.ok_or_else(|| {
            LedgerError::Integrity(format!("withdrawal request {id} vanished after insert"))
        })?;
        tx.commit()?;

        tracing::info!(withdrawal = %id, owner = %owner, amount = %amount, "Withdrawal requested");
        Ok(request)
    }

    /// Approve or reject a pending withdrawal request.
    ///
    /// Approval debits the owner's capital in the same transaction as the
    /// status change. Under [`WithdrawalPolicy::Strict`] an approval that
    /// would leave capital negative fails with `InsufficientBalance` and the
    /// request stays pending.
    pub fn decide_withdrawal(
        &mut self,
        caller: Caller,
        id: WithdrawalId,
        decision: WithdrawalDecision,
    ) -> Result<WithdrawalRequest, LedgerError> {
        require_admin(caller, "withdrawal decision")?;
        let policy = self.options().withdrawal_policy;

        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let request = load_withdrawal(&tx, id)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::WithdrawalRequest, id.value()))?;
        if request.status.is_terminal() {
            tracing::warn!(
                withdrawal = %id,
                status = %request.status,
                "Refused decision on settled withdrawal"
            );
            return Err(LedgerError::InvalidTransition {
                kind: EntityKind::WithdrawalRequest,
                id: id.value(),
                status: request.status.as_str(),
            });
        }

        let changed = tx.execute(
            "UPDATE withdrawals SET status = ?1, processed_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![
                decision.target().as_str(),
                Utc::now(),
                id.value(),
                WithdrawalStatus::Pending.as_str()
            ],
        )?;
        if changed != 1 {
            return Err(LedgerError::InvalidTransition {
                kind: EntityKind::WithdrawalRequest,
                id: id.value(),
                status: "decided",
            });
        }

        if decision == WithdrawalDecision::Approve {
            let floor = match policy {
                WithdrawalPolicy::Permissive => None,
                WithdrawalPolicy::Strict => Some(Money::ZERO),
            };
            let debit = Money::from_minor(-request.amount.minor_units());

            match adjust_balance(&tx, request.owner_id, Balance::Capital, debit, floor)? {
                BalanceUpdate::Applied(capital) => {
                    if capital.minor_units() < 0 {
                        tracing::warn!(
                            owner = %request.owner_id,
                            capital = %capital,
                            "Withdrawal left capital negative"
                        );
                    }
                }
                BalanceUpdate::BelowFloor { available } => {
                    tracing::warn!(
                        withdrawal = %id,
                        owner = %request.owner_id,
                        available = %available,
                        requested = %request.amount,
                        "Refused withdrawal exceeding capital"
                    );
                    return Err(LedgerError::InsufficientBalance {
                        member: request.owner_id,
                        available,
                        requested: request.amount,
                    });
                }
                BalanceUpdate::MissingMember => {
                    tracing::error!(
                        withdrawal = %id,
                        owner = %request.owner_id,
                        "Withdrawal owner missing"
                    );
                    return Err(LedgerError::Integrity(format!(
                        "withdrawal request {id} belongs to missing member {}",
                        request.owner_id
                    )));
                }
                BalanceUpdate::WouldOverflow => {
                    tracing::error!(
                        withdrawal = %id,
                        owner = %request.owner_id,
                        "Capital debit would overflow"
                    );
                    return Err(LedgerError::BalanceOverflow {
                        member: request.owner_id,
                        balance: Balance::Capital.column(),
                        delta: debit,
                    });
                }
            }
        }

        let decided = load_withdrawal(&tx, id)?.ok_or_else(|| {
            LedgerError::Integrity(format!("withdrawal request {id} vanished during decision"))
        })?;
        tx.commit()?;

        tracing::info!(
            withdrawal = %id,
            owner = %decided.owner_id,
            amount = %decided.amount,
            status = %decided.status,
            policy = policy.as_str(),
            "Withdrawal decided"
        );
        Ok(decided)
    }

    pub fn withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest, LedgerError> {
        load_withdrawal(&self.db, id)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::WithdrawalRequest, id.value()))
    }

    pub fn withdrawals_for_owner(
        &self,
        owner: MemberId,
    ) -> Result<Vec<WithdrawalRequest>, LedgerError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE owner_id = ?1 ORDER BY id ASC"
        ))?;
        let requests = stmt
            .query_map([owner.value()], withdrawal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(requests)
    }

    /// Every withdrawal request on the platform.
    pub fn list_withdrawals(&self, caller: Caller) -> Result<Vec<WithdrawalRequest>, LedgerError> {
        require_admin(caller, "withdrawal listing")?;

        let mut stmt = self.db.prepare(&format!(
            "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals ORDER BY id ASC"
        ))?;
        let requests = stmt
            .query_map([], withdrawal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(requests)
    }
}
