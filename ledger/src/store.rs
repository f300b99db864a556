//! SQLite-backed ledger store.
//!
//! One [`Ledger`] wraps one connection. Concurrent request handlers each open
//! their own `Ledger` over the same database file; every mutating operation
//! runs inside an immediate transaction so writers serialize on the database
//! lock and balance updates are relative (`x = x + ?`), never blind writes.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use capital_types::{
    AggregationScope, EnumParseError, Investment, InvestmentId, InvestmentStatus, JoinStatus,
    Member, MemberId, Money, WithdrawalId, WithdrawalPolicy, WithdrawalRequest, WithdrawalStatus,
};

use crate::error::LedgerError;
use crate::secure_fs::prepare_ledger_file;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Policy switches and lock behaviour for a [`Ledger`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerOptions {
    pub withdrawal_policy: WithdrawalPolicy,
    pub aggregation_scope: AggregationScope,
    /// How long a writer waits for a competing writer before failing.
    pub busy_timeout: Duration,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            withdrawal_policy: WithdrawalPolicy::default(),
            aggregation_scope: AggregationScope::default(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Persistent ledger of members, investments and withdrawal requests.
pub struct Ledger {
    pub(crate) db: Connection,
    options: LedgerOptions,
}

impl Ledger {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            join_status TEXT NOT NULL DEFAULT 'pending'
                CHECK (join_status IN ('pending', 'approved', 'rejected')),
            is_admin INTEGER NOT NULL DEFAULT 0,
            total_capital INTEGER NOT NULL DEFAULT 0,
            total_returns INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS investments (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL REFERENCES members(id),
            amount INTEGER NOT NULL CHECK (amount > 0),
            generated_returns INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'accepted', 'rejected')),
            proof_reference TEXT NOT NULL,
            invested_at TEXT NOT NULL,
            decided_at TEXT
        );

        CREATE TABLE IF NOT EXISTS withdrawals (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL REFERENCES members(id),
            amount INTEGER NOT NULL CHECK (amount > 0),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'rejected')),
            requested_at TEXT NOT NULL,
            processed_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_investments_owner
        ON investments(owner_id);

        CREATE INDEX IF NOT EXISTS idx_withdrawals_owner
        ON withdrawals(owner_id);
    ";

    /// Open or create the ledger database at the given path.
    pub fn open(path: impl AsRef<Path>, options: LedgerOptions) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        prepare_ledger_file(path).map_err(|source| LedgerError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let db = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened ledger database");
        Self::initialize(db, options)
    }

    /// Open an in-memory ledger (for testing).
    pub fn open_in_memory(options: LedgerOptions) -> Result<Self, LedgerError> {
        let db = Connection::open_in_memory()?;
        Self::initialize(db, options)
    }

    fn initialize(db: Connection, options: LedgerOptions) -> Result<Self, LedgerError> {
        db.busy_timeout(options.busy_timeout)?;
        db.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL; PRAGMA foreign_keys=ON;",
        )?;
        db.execute_batch(Self::SCHEMA)?;
        Ok(Self { db, options })
    }

    #[must_use]
    pub fn options(&self) -> LedgerOptions {
        self.options
    }
}

// ── Row mapping ─────────────────────────────────────────────────────────

pub(crate) const MEMBER_COLUMNS: &str =
    "id, name, email, join_status, is_admin, total_capital, total_returns, created_at";

pub(crate) const INVESTMENT_COLUMNS: &str = "id, owner_id, amount, generated_returns, status, \
     proof_reference, invested_at, decided_at";

pub(crate) const WITHDRAWAL_COLUMNS: &str =
    "id, owner_id, amount, status, requested_at, processed_at";

fn parse_text<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Result<T, EnumParseError>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: MemberId::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        join_status: parse_text(row, 3, JoinStatus::parse)?,
        is_admin: row.get(4)?,
        total_capital: Money::from_minor(row.get(5)?),
        total_returns: Money::from_minor(row.get(6)?),
        created_at: row.get(7)?,
    })
}

pub(crate) fn investment_from_row(row: &Row<'_>) -> rusqlite::Result<Investment> {
    Ok(Investment {
        id: InvestmentId::new(row.get(0)?),
        owner_id: MemberId::new(row.get(1)?),
        amount: Money::from_minor(row.get(2)?),
        generated_returns: Money::from_minor(row.get(3)?),
        status: parse_text(row, 4, InvestmentStatus::parse)?,
        proof_reference: row.get(5)?,
        invested_at: row.get(6)?,
        decided_at: row.get(7)?,
    })
}

pub(crate) fn withdrawal_from_row(row: &Row<'_>) -> rusqlite::Result<WithdrawalRequest> {
    Ok(WithdrawalRequest {
        id: WithdrawalId::new(row.get(0)?),
        owner_id: MemberId::new(row.get(1)?),
        amount: Money::from_minor(row.get(2)?),
        status: parse_text(row, 3, WithdrawalStatus::parse)?,
        requested_at: row.get(4)?,
        processed_at: row.get(5)?,
    })
}

pub(crate) fn load_member(db: &Connection, id: MemberId) -> rusqlite::Result<Option<Member>> {
    db.query_row(
        &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"),
        [id.value()],
        member_from_row,
    )
    .optional()
}

pub(crate) fn load_investment(
    db: &Connection,
    id: InvestmentId,
) -> rusqlite::Result<Option<Investment>> {
    db.query_row(
        &format!("SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = ?1"),
        [id.value()],
        investment_from_row,
    )
    .optional()
}

pub(crate) fn load_withdrawal(
    db: &Connection,
    id: WithdrawalId,
) -> rusqlite::Result<Option<WithdrawalRequest>> {
    db.query_row(
        &format!("SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE id = ?1"),
        [id.value()],
        withdrawal_from_row,
    )
    .optional()
}

pub(crate) fn member_exists(db: &Connection, id: MemberId) -> rusqlite::Result<bool> {
    db.query_row(
        "SELECT EXISTS(SELECT 1 FROM members WHERE id = ?1)",
        [id.value()],
        |row| row.get(0),
    )
}

// ── Balance mutation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Balance {
    Capital,
    Returns,
}

impl Balance {
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Balance::Capital => "total_capital",
            Balance::Returns => "total_returns",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BalanceUpdate {
    /// The new balance after the delta was applied.
    Applied(Money),
    MissingMember,
    /// The result would drop below the requested floor; nothing was written.
    BelowFloor { available: Money },
    WouldOverflow,
}

/// Add `delta` to one of a member's balances relative to its stored value.
///
/// The guard conditions live in the UPDATE itself, so the check and the write
/// are one statement. When no row is updated a follow-up read explains why.
pub(crate) fn adjust_balance(
    db: &Connection,
    member: MemberId,
    balance: Balance,
    delta: Money,
    floor: Option<Money>,
) -> rusqlite::Result<BalanceUpdate> {
    let column = balance.column();
    let delta = delta.minor_units();
    let upper = if delta > 0 { i64::MAX - delta } else { i64::MAX };
    let lower = if delta < 0 { i64::MIN - delta } else { i64::MIN };

    let updated: Option<i64> = db
        .query_row(
            &format!(
                "UPDATE members SET {column} = {column} + ?1
                 WHERE id = ?2
                   AND {column} BETWEEN ?3 AND ?4
                   AND (?5 IS NULL OR {column} + ?1 >= ?5)
                 RETURNING {column}"
            ),
            params![delta, member.value(), lower, upper, floor.map(Money::minor_units)],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(value) = updated {
        return Ok(BalanceUpdate::Applied(Money::from_minor(value)));
    }

    let current: Option<i64> = db
        .query_row(
            &format!("SELECT {column} FROM members WHERE id = ?1"),
            [member.value()],
            |row| row.get(0),
        )
        .optional()?;

    Ok(match current {
        None => BalanceUpdate::MissingMember,
        Some(value) if value < lower || value > upper => BalanceUpdate::WouldOverflow,
        Some(value) => BalanceUpdate::BelowFloor {
            available: Money::from_minor(value),
        },
    })
}
