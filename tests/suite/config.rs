//! Configuration flowing into ledger behaviour.

use std::fs;
use std::time::Duration;

use capital_config::CapitalConfig;
use capital_ledger::{Ledger, LedgerError, LedgerOptions};
use capital_types::{AggregationScope, Money, WithdrawalDecision, WithdrawalPolicy};
use pretty_assertions::assert_eq;

use crate::common::admin;

fn options_from(config: &CapitalConfig) -> LedgerOptions {
    LedgerOptions {
        withdrawal_policy: config.withdrawal_policy(),
        aggregation_scope: config.aggregation_scope(),
        busy_timeout: config.busy_timeout(),
    }
}

#[test]
fn configured_ledger_applies_strict_withdrawals() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("ledger.db");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[ledger]\npath = {:?}\nbusy_timeout_ms = 250\n\n\
             [policy]\nwithdrawals = \"strict\"\nplatform_totals = \"accepted_only\"\n",
            db_path.display().to_string()
        ),
    )
    .unwrap();

    let config = CapitalConfig::load_from(&config_path).unwrap();
    let options = options_from(&config);
    assert_eq!(
        options,
        LedgerOptions {
            withdrawal_policy: WithdrawalPolicy::Strict,
            aggregation_scope: AggregationScope::AcceptedOnly,
            busy_timeout: Duration::from_millis(250),
        }
    );
    assert_eq!(config.ledger_path(), Some(db_path.clone()));

    let mut ledger = Ledger::open(&db_path, options).unwrap();
    let owner = ledger
        .register_member("Ada", "ada@example.com", false)
        .unwrap()
        .id;
    let request = ledger
        .request_withdrawal(owner, Money::from_major(1).unwrap())
        .unwrap()
        .id;
    let err = ledger
        .decide_withdrawal(admin(), request, WithdrawalDecision::Approve)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert!(err.is_client_error());
}

#[test]
fn empty_config_yields_default_options() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = CapitalConfig::load_from(&config_path).unwrap();
    assert_eq!(options_from(&config), LedgerOptions::default());
}
