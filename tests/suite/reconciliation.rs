//! Platform totals, analytics and gain/loss on a shared database.

use capital_ledger::{LedgerOptions, percentage_gain_loss};
use capital_types::{AggregationScope, InvestmentDecision, Money};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{SharedLedger, admin, register};

#[test]
fn handles_with_different_scopes_see_the_same_rows() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut ledger = shared.handle();
    let owner = register(&mut ledger, "ada@example.com");
    ledger
        .create_investment(owner, Money::from_major(100).unwrap(), "pending")
        .unwrap();
    let accepted = ledger
        .create_investment(owner, Money::from_major(200).unwrap(), "accepted")
        .unwrap()
        .id;
    ledger
        .decide_investment(admin(), accepted, InvestmentDecision::Accept)
        .unwrap();

    assert_eq!(
        ledger.platform_totals().unwrap().total_invested,
        Money::from_major(300).unwrap()
    );

    let accepted_only = capital_ledger::Ledger::open(
        shared.path(),
        LedgerOptions {
            aggregation_scope: AggregationScope::AcceptedOnly,
            ..shared.options()
        },
    )
    .unwrap();
    assert_eq!(
        accepted_only.platform_totals().unwrap().total_invested,
        Money::from_major(200).unwrap()
    );
}

#[test]
fn analytics_serializes_as_decimal_strings() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut ledger = shared.handle();
    let owner = register(&mut ledger, "bo@example.com");
    register(&mut ledger, "cy@example.com");
    let id = ledger
        .create_investment(owner, Money::from_minor(12_345), "r")
        .unwrap()
        .id;
    ledger
        .record_generated_returns(admin(), id, Money::from_minor(1_005))
        .unwrap();
    ledger
        .request_withdrawal(owner, Money::from_major(1).unwrap())
        .unwrap();

    let value = serde_json::to_value(ledger.analytics().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "total_members": 2,
            "active_members": 1,
            "totals": {
                "scope": "all_statuses",
                "total_invested": "123.45",
                "total_generated_returns": "10.05",
            },
            "total_withdrawal_requests": 1,
        })
    );
}

#[test]
fn gain_loss_follows_accrued_returns() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut ledger = shared.handle();
    let owner = register(&mut ledger, "dee@example.com");

    // No capital yet: always zero, whatever the returns.
    let member = ledger
        .accrue_returns(admin(), owner, Money::from_major(10).unwrap())
        .unwrap();
    assert_eq!(percentage_gain_loss(&member).to_string(), "0.00");

    let id = ledger
        .create_investment(owner, Money::from_major(300).unwrap(), "r")
        .unwrap()
        .id;
    ledger
        .decide_investment(admin(), id, InvestmentDecision::Accept)
        .unwrap();

    let member = ledger.member(owner).unwrap();
    assert_eq!(percentage_gain_loss(&member).to_string(), "3.33");

    let member = ledger
        .accrue_returns(admin(), owner, Money::from_major(-40).unwrap())
        .unwrap();
    assert_eq!(member.total_returns, Money::from_major(-30).unwrap());
    assert_eq!(percentage_gain_loss(&member).to_string(), "-10.00");
}
