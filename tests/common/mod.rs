//! Shared test utilities and fixtures
//!
//! File-backed ledgers in a temporary directory, so several handles (and
//! threads) can share one database the way concurrent request handlers do.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use capital_ledger::{Ledger, LedgerOptions};
use capital_types::{Caller, MemberId};

pub struct SharedLedger {
    _dir: TempDir,
    path: PathBuf,
    options: LedgerOptions,
}

impl SharedLedger {
    /// Create the database once up front so later handles only attach.
    pub fn new(options: LedgerOptions) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ledger.db");
        Ledger::open(&path, options).expect("create ledger");
        Self {
            _dir: dir,
            path,
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> LedgerOptions {
        self.options
    }

    /// A fresh handle with its own connection.
    pub fn handle(&self) -> Ledger {
        Ledger::open(&self.path, self.options).expect("open ledger handle")
    }
}

pub fn admin() -> Caller {
    Caller::admin(MemberId::new(0))
}

pub fn register(ledger: &mut Ledger, email: &str) -> MemberId {
    ledger
        .register_member("Test Member", email, false)
        .expect("register member")
        .id
}
