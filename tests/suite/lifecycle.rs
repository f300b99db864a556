//! End-to-end lifecycles on a file-backed ledger.

use capital_ledger::{LedgerError, LedgerOptions};
use capital_types::{
    Caller, InvestmentDecision, InvestmentStatus, Money, WithdrawalDecision, WithdrawalStatus,
};
use pretty_assertions::assert_eq;

use crate::common::{SharedLedger, admin, register};

#[test]
fn capital_tracks_accepted_investments_minus_approved_withdrawals() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut ledger = shared.handle();
    let owner = register(&mut ledger, "ada@example.com");

    let decisions = [
        (Money::from_minor(10_000), InvestmentDecision::Accept),
        (Money::from_minor(2_550), InvestmentDecision::Reject),
        (Money::from_minor(7_525), InvestmentDecision::Accept),
    ];
    for (amount, decision) in decisions {
        let id = ledger.create_investment(owner, amount, "receipt").unwrap().id;
        ledger.decide_investment(admin(), id, decision).unwrap();
    }
    // Left pending on purpose.
    ledger
        .create_investment(owner, Money::from_major(999).unwrap(), "receipt")
        .unwrap();

    let approved = ledger
        .request_withdrawal(owner, Money::from_minor(3_000))
        .unwrap()
        .id;
    let rejected = ledger
        .request_withdrawal(owner, Money::from_minor(500))
        .unwrap()
        .id;
    ledger
        .decide_withdrawal(admin(), approved, WithdrawalDecision::Approve)
        .unwrap();
    ledger
        .decide_withdrawal(admin(), rejected, WithdrawalDecision::Reject)
        .unwrap();

    let statement = ledger.statement(Caller::member(owner), owner).unwrap();
    let statuses: Vec<_> = statement.investments.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        [
            InvestmentStatus::Accepted,
            InvestmentStatus::Rejected,
            InvestmentStatus::Accepted,
            InvestmentStatus::Pending,
        ]
    );
    let withdrawal_statuses: Vec<_> = statement.withdrawals.iter().map(|w| w.status).collect();
    assert_eq!(
        withdrawal_statuses,
        [WithdrawalStatus::Approved, WithdrawalStatus::Rejected]
    );

    let expected = statement
        .investments
        .iter()
        .filter(|i| i.status == InvestmentStatus::Accepted)
        .map(|i| i.amount.minor_units())
        .sum::<i64>()
        - statement
            .withdrawals
            .iter()
            .filter(|w| w.status == WithdrawalStatus::Approved)
            .map(|w| w.amount.minor_units())
            .sum::<i64>();
    assert_eq!(statement.member.total_capital, Money::from_minor(expected));
    assert_eq!(statement.member.total_capital.to_string(), "145.25");
}

#[test]
fn settled_records_refuse_every_further_decision() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut ledger = shared.handle();
    let owner = register(&mut ledger, "bo@example.com");

    let investment = ledger
        .create_investment(owner, Money::from_major(100).unwrap(), "r")
        .unwrap()
        .id;
    ledger
        .decide_investment(admin(), investment, InvestmentDecision::Reject)
        .unwrap();
    for decision in [InvestmentDecision::Accept, InvestmentDecision::Reject] {
        assert!(matches!(
            ledger.decide_investment(admin(), investment, decision),
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    let withdrawal = ledger
        .request_withdrawal(owner, Money::from_major(10).unwrap())
        .unwrap()
        .id;
    ledger
        .decide_withdrawal(admin(), withdrawal, WithdrawalDecision::Approve)
        .unwrap();
    assert!(matches!(
        ledger.decide_withdrawal(admin(), withdrawal, WithdrawalDecision::Approve),
        Err(LedgerError::InvalidTransition { .. })
    ));

    // Permissive default: one approved withdrawal against zero capital.
    assert_eq!(
        ledger.member(owner).unwrap().total_capital,
        Money::from_major(-10).unwrap()
    );
}

#[test]
fn decisions_survive_reopening_the_database() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let (owner, id) = {
        let mut ledger = shared.handle();
        let owner = register(&mut ledger, "cy@example.com");
        let id = ledger
            .create_investment(owner, Money::from_major(40).unwrap(), "r")
            .unwrap()
            .id;
        ledger
            .decide_investment(admin(), id, InvestmentDecision::Accept)
            .unwrap();
        (owner, id)
    };

    let ledger = shared.handle();
    let investment = ledger.investment(id).unwrap();
    assert_eq!(investment.status, InvestmentStatus::Accepted);
    assert!(investment.decided_at.is_some());
    assert_eq!(
        ledger.member(owner).unwrap().total_capital,
        Money::from_major(40).unwrap()
    );
}

#[test]
fn members_cannot_decide_their_own_requests() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut ledger = shared.handle();
    let owner = register(&mut ledger, "dee@example.com");
    let own = Caller::member(owner);

    let investment = ledger
        .create_investment(owner, Money::from_major(5).unwrap(), "r")
        .unwrap()
        .id;
    assert!(matches!(
        ledger.decide_investment(own, investment, InvestmentDecision::Accept),
        Err(LedgerError::Forbidden { .. })
    ));
    assert_eq!(
        ledger.investment(investment).unwrap().status,
        InvestmentStatus::Pending
    );
    assert!(matches!(
        ledger.list_withdrawals(own),
        Err(LedgerError::Forbidden { .. })
    ));
}
