//! Account-balance ledger for a member investment platform
//!
//! This crate provides:
//! - Member registration and join-request review
//! - Investment submission and one-time accept/reject decisions
//! - Withdrawal requests with permissive or strict balance checks
//! - Returns accrual against a member's running balance
//! - Platform totals, analytics and per-member statements
//!
//! # Architecture
//!
//! ```text
//! Ledger (one SQLite connection per handle)
//! ├── members      registry, join status
//! ├── investments  Pending → Accepted | Rejected, credits capital once
//! ├── withdrawals  Pending → Approved | Rejected, debits capital once
//! ├── returns      admin accrual against total_returns
//! └── queries      read-only totals and statements
//! ```
//!
//! Balances only ever move through a relative update inside the same
//! immediate transaction as the status change that justifies it.

mod error;
mod investments;
mod members;
mod queries;
mod returns;
mod secure_fs;
mod store;
mod withdrawals;

pub use error::{EntityKind, LedgerError};
pub use queries::{
    AcceptedInvestments, Analytics, MemberStatement, PlatformTotals, percentage_gain_loss,
};
pub use store::{Ledger, LedgerOptions};
