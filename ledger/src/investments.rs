//! Investment lifecycle manager.
//!
//! An investment is created `Pending` by its owner and decided exactly once by
//! an administrator. Acceptance credits the owner's capital in the same
//! transaction that flips the status, so a decided investment without its
//! balance effect is never committed.

use chrono::Utc;
use rusqlite::{TransactionBehavior, params};

use capital_types::{
    Caller, Investment, InvestmentDecision, InvestmentId, InvestmentStatus, MemberId, Money,
    NonEmptyString,
};

use crate::error::{EntityKind, LedgerError, require_admin};
use crate::store::{
    Balance, BalanceUpdate, INVESTMENT_COLUMNS, Ledger, adjust_balance, investment_from_row,
    load_investment, member_exists,
};

impl Ledger {
    /// Record a new pending investment for `owner`.
    ///
    /// `proof_reference` points at externally stored evidence and is kept
    /// verbatim. No balance changes until an administrator accepts.
    pub fn create_investment(
        &mut self,
        owner: MemberId,
        amount: Money,
        proof_reference: &str,
    ) -> Result<Investment, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "investment amount must be positive (got {amount})"
            )));
        }
        let proof = NonEmptyString::new(proof_reference)
            .map_err(|_| LedgerError::validation("proof reference is required"))?;

        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !member_exists(&tx, owner)? {
            return Err(LedgerError::validation(format!(
                "member {owner} does not exist"
            )));
        }

        tx.execute(
            "INSERT INTO investments (owner_id, amount, status, proof_reference, invested_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                owner.value(),
                amount.minor_units(),
                InvestmentStatus::Pending.as_str(),
                proof.as_str(),
                Utc::now()
            ],
        )?;
        let id = InvestmentId::new(tx.last_insert_rowid());
        let investment = load_investment(&tx, id)?.ok_or_else(|| {
            LedgerError::Integrity(format!("investment {id} vanished after insert"))
        })?;
        tx.commit()?;

        tracing::info!(investment = %id, owner = %owner, amount = %amount, "Investment created");
        Ok(investment)
    }

    /// Accept or reject a pending investment.
    ///
    /// Acceptance adds the amount to the owner's capital. Deciding an
    /// investment that is no longer pending fails with `InvalidTransition`
    /// and changes nothing, so a retried accept never credits twice.
    pub fn decide_investment(
        &mut self,
        caller: Caller,
        id: InvestmentId,
        decision: InvestmentDecision,
    ) -> Result<Investment, LedgerError> {
        require_admin(caller, "investment decision")?;

        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let investment = load_investment(&tx, id)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Investment, id.value()))?;
        if investment.status.is_terminal() {
            tracing::warn!(
                investment = %id,
                status = %investment.status,
                "Refused decision on settled investment"
            );
            return Err(LedgerError::InvalidTransition {
                kind: EntityKind::Investment,
                id: id.value(),
                status: investment.status.as_str(),
            });
        }

        let target = decision.target();
        let changed = tx.execute(
            "UPDATE investments SET status = ?1, decided_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![
                target.as_str(),
                Utc::now(),
                id.value(),
                InvestmentStatus::Pending.as_str()
            ],
        )?;
        if changed != 1 {
            return Err(LedgerError::InvalidTransition {
                kind: EntityKind::Investment,
                id: id.value(),
                status: "decided",
            });
        }

        if decision == InvestmentDecision::Accept {
            match adjust_balance(
                &tx,
                investment.owner_id,
                Balance::Capital,
                investment.amount,
                None,
            )? {
                BalanceUpdate::Applied(capital) => {
                    tracing::debug!(owner = %investment.owner_id, capital = %capital, "Credited capital");
                }
                BalanceUpdate::MissingMember => {
                    tracing::error!(
                        investment = %id,
                        owner = %investment.owner_id,
                        "Investment owner missing"
                    );
                    return Err(LedgerError::Integrity(format!(
                        "investment {id} belongs to missing member {}",
                        investment.owner_id
                    )));
                }
                BalanceUpdate::WouldOverflow | BalanceUpdate::BelowFloor { .. } => {
                    tracing::error!(
                        investment = %id,
                        owner = %investment.owner_id,
                        "Capital credit would overflow"
                    );
                    return Err(LedgerError::BalanceOverflow {
                        member: investment.owner_id,
                        balance: Balance::Capital.column(),
                        delta: investment.amount,
                    });
                }
            }
        }

        let decided = load_investment(&tx, id)?.ok_or_else(|| {
            LedgerError::Integrity(format!("investment {id} vanished during decision"))
        })?;
        tx.commit()?;

        tracing::info!(
            investment = %id,
            owner = %decided.owner_id,
            amount = %decided.amount,
            status = %decided.status,
            "Investment decided"
        );
        Ok(decided)
    }

    /// Overwrite the informational returns figure on one investment.
    ///
    /// This never touches the owner's accrued `total_returns`.
    pub fn record_generated_returns(
        &mut self,
        caller: Caller,
        id: InvestmentId,
        amount: Money,
    ) -> Result<Investment, LedgerError> {
        require_admin(caller, "generated returns update")?;

        let changed = self.db.execute(
            "UPDATE investments SET generated_returns = ?1 WHERE id = ?2",
            params![amount.minor_units(), id.value()],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(EntityKind::Investment, id.value()));
        }

        tracing::info!(investment = %id, generated_returns = %amount, "Recorded generated returns");
        self.investment(id)
    }

    pub fn investment(&self, id: InvestmentId) -> Result<Investment, LedgerError> {
        load_investment(&self.db, id)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Investment, id.value()))
    }

    /// Investments owned by `owner`, optionally limited to one status.
    pub fn investments_for_owner(
        &self,
        owner: MemberId,
        status: Option<InvestmentStatus>,
    ) -> Result<Vec<Investment>, LedgerError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investments
             WHERE owner_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY id ASC"
        ))?;
        let investments = stmt
            .query_map(
                params![owner.value(), status.map(InvestmentStatus::as_str)],
                investment_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(investments)
    }

    /// Every investment on the platform.
    pub fn list_investments(&self, caller: Caller) -> Result<Vec<Investment>, LedgerError> {
        require_admin(caller, "investment listing")?;

        let mut stmt = self.db.prepare(&format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investments ORDER BY id ASC"
        ))?;
        let investments = stmt
            .query_map([], investment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(investments)
    }
}
