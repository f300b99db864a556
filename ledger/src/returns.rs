//! Returns accrual.
//!
//! Administrators post return amounts directly against a member. Negative
//! amounts are corrections and no floor is enforced. Accrual is unrelated to
//! any investment's `generated_returns`.

use rusqlite::TransactionBehavior;

use capital_types::{Caller, Member, MemberId, Money};

use crate::error::{EntityKind, LedgerError, require_admin};
use crate::store::{Balance, BalanceUpdate, Ledger, adjust_balance, load_member};

impl Ledger {
    /// Add `amount` (possibly negative) to the member's accrued returns.
    pub fn accrue_returns(
        &mut self,
        caller: Caller,
        owner: MemberId,
        amount: Money,
    ) -> Result<Member, LedgerError> {
        require_admin(caller, "returns accrual")?;

        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        match adjust_balance(&tx, owner, Balance::Returns, amount, None)? {
            BalanceUpdate::Applied(_) => {}
            BalanceUpdate::MissingMember => {
                return Err(LedgerError::not_found(EntityKind::Member, owner.value()));
            }
            BalanceUpdate::WouldOverflow | BalanceUpdate::BelowFloor { .. } => {
                return Err(LedgerError::BalanceOverflow {
                    member: owner,
                    balance: Balance::Returns.column(),
                    delta: amount,
                });
            }
        }

        let member = load_member(&tx, owner)?.ok_or_else(|| {
            LedgerError::Integrity(format!("member {owner} vanished during accrual"))
        })?;
        tx.commit()?;

        tracing::info!(
            member = %owner,
            amount = %amount,
            total_returns = %member.total_returns,
            "Accrued returns"
        );
        Ok(member)
    }
}
