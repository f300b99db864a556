//! Member registry: registration and join-request review.

use chrono::Utc;
use rusqlite::{TransactionBehavior, params};

use capital_types::{Caller, JoinStatus, Member, MemberId, NonEmptyString};

use crate::error::{EntityKind, LedgerError, require_admin};
use crate::store::{Ledger, MEMBER_COLUMNS, load_member, member_from_row};

impl Ledger {
    /// Register a member with zero balances and a pending join request.
    ///
    /// Emails are unique ignoring case.
    pub fn register_member(
        &mut self,
        name: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<Member, LedgerError> {
        let name = NonEmptyString::new(name.trim())
            .map_err(|_| LedgerError::validation("member name is required"))?;
        let email = NonEmptyString::new(email.trim())
            .map_err(|_| LedgerError::validation("member email is required"))?;

        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM members WHERE email = ?1)",
            [email.as_str()],
            |row| row.get(0),
        )?;
        if taken {
            return Err(LedgerError::validation(format!(
                "email {email} is already registered"
            )));
        }

        tx.execute(
            "INSERT INTO members (name, email, join_status, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                name.as_str(),
                email.as_str(),
                JoinStatus::Pending.as_str(),
                is_admin,
                Utc::now()
            ],
        )?;
        let id = MemberId::new(tx.last_insert_rowid());
        let member = load_member(&tx, id)?
            .ok_or_else(|| LedgerError::Integrity(format!("member {id} vanished after insert")))?;
        tx.commit()?;

        tracing::info!(member = %id, is_admin, "Registered member");
        Ok(member)
    }

    pub fn member(&self, id: MemberId) -> Result<Member, LedgerError> {
        load_member(&self.db, id)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Member, id.value()))
    }

    /// Record an administrator's review of a join request.
    ///
    /// Join status is an administrative label only; it does not gate
    /// investments or withdrawals.
    pub fn set_join_status(
        &mut self,
        caller: Caller,
        id: MemberId,
        status: JoinStatus,
    ) -> Result<Member, LedgerError> {
        require_admin(caller, "join status review")?;

        let changed = self.db.execute(
            "UPDATE members SET join_status = ?1 WHERE id = ?2",
            params![status.as_str(), id.value()],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(EntityKind::Member, id.value()));
        }

        tracing::info!(member = %id, status = %status, "Updated join status");
        self.member(id)
    }

    /// All members in registration order.
    pub fn list_members(&self, caller: Caller) -> Result<Vec<Member>, LedgerError> {
        require_admin(caller, "member listing")?;

        let mut stmt = self
            .db
            .prepare(&format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY id ASC"))?;
        let members = stmt
            .query_map([], member_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }
}
