//! Capital CLI - administrator front end for the member ledger.
//!
//! Each invocation opens its own [`Ledger`] handle over the configured
//! database, runs one operation and prints the result as JSON on stdout.
//!
//! ```text
//! main() -> CapitalConfig::load() -> Ledger::open() -> Command::run() -> stdout
//! ```
//!
//! The identity layer is out of scope; `--caller` and `--admin` stand in for
//! whatever authenticated the request.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::{
    fs::{self, File, OpenOptions},
    io, iter,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, prelude::*};

use capital_config::CapitalConfig;
use capital_ledger::{Ledger, LedgerOptions};
use capital_types::{Caller, MemberId};

use crate::commands::Command;

#[derive(Parser)]
#[command(name = "capital")]
#[command(about = "Record member investments, withdrawals and returns")]
struct Cli {
    /// Ledger database file (overrides `[ledger] path` from config)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Member id of the caller
    #[arg(long, global = true, default_value_t = 0)]
    caller: i64,

    /// Act as an administrator
    #[arg(long, global = true)]
    admin: bool,

    #[command(subcommand)]
    command: Command,
}

const LOG_ENV: &str = "CAPITAL_LOG";
const DEFAULT_FILTER: &str = "info";
const LOG_FILE: &str = "capital.log";

/// Directives from `CAPITAL_LOG`, then `RUST_LOG`, then `info`.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// The data directory's `logs/`, then `./.capital/logs`.
fn log_dirs() -> impl Iterator<Item = PathBuf> {
    capital_config::data_dir()
        .into_iter()
        .chain(iter::once(PathBuf::from(".capital")))
        .map(|dir| dir.join("logs"))
}

/// Open `capital.log` under `dir` for appending. Owner-only on Unix, like
/// the ledger file itself.
fn open_log(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    options.mode(0o600);
    options.open(dir.join(LOG_FILE))
}

/// stdout carries the JSON result, so events go to the first usable log
/// directory or nowhere.
fn init_tracing() {
    let filter = log_filter();
    let mut unusable = Vec::new();
    let opened = log_dirs().find_map(|dir| match open_log(&dir) {
        Ok(file) => Some((dir, file)),
        Err(error) => {
            unusable.push((dir, error));
            None
        }
    });

    let Some((dir, file)) = opened else {
        tracing_subscriber::registry().with(filter).init();
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::debug!(dir = %dir.display(), file = LOG_FILE, "Logging to file");
    for (dir, error) in unusable {
        tracing::warn!(dir = %dir.display(), %error, "Skipped unusable log directory");
    }
}

fn open_ledger(cli: &Cli) -> Result<Ledger> {
    let config = CapitalConfig::load()
        .context("loading configuration")?
        .unwrap_or_default();

    let options = LedgerOptions {
        withdrawal_policy: config.withdrawal_policy(),
        aggregation_scope: config.aggregation_scope(),
        busy_timeout: config.busy_timeout(),
    };
    let path = cli
        .ledger
        .clone()
        .or_else(|| config.ledger_path())
        .context("no ledger path configured and no home directory to default to")?;

    tracing::debug!(
        path = %path.display(),
        withdrawals = options.withdrawal_policy.as_str(),
        platform_totals = options.aggregation_scope.as_str(),
        "Opening ledger"
    );
    Ledger::open(&path, options).with_context(|| format!("opening ledger {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut ledger = open_ledger(&cli)?;
    let caller = Caller::new(MemberId::new(cli.caller), cli.admin);

    let output = cli.command.run(&mut ledger, caller)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
