//! Decisions racing on separate handles over one database file.

use std::sync::{Arc, Barrier};
use std::thread;

use capital_ledger::{Ledger, LedgerError, LedgerOptions};
use capital_types::{InvestmentDecision, Money, WithdrawalDecision, WithdrawalPolicy};
use pretty_assertions::assert_eq;

use crate::common::{SharedLedger, admin, register};

/// Run `job(i, handle)` on `workers` threads, each with its own handle,
/// released together.
fn race<T, F>(shared: &SharedLedger, workers: usize, job: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize, &mut Ledger) -> T + Send + Sync + 'static,
{
    let job = Arc::new(job);
    let barrier = Arc::new(Barrier::new(workers));
    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let mut ledger = shared.handle();
            let job = Arc::clone(&job);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                job(i, &mut ledger)
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect()
}

#[test]
fn concurrent_acceptances_both_credit_capital() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut setup = shared.handle();
    let owner = register(&mut setup, "race@example.com");
    let ids = [
        setup
            .create_investment(owner, Money::from_major(100).unwrap(), "p1")
            .unwrap()
            .id,
        setup
            .create_investment(owner, Money::from_major(50).unwrap(), "p2")
            .unwrap()
            .id,
    ];

    let results = race(&shared, 2, move |i, ledger| {
        ledger.decide_investment(admin(), ids[i], InvestmentDecision::Accept)
    });
    assert!(results.iter().all(Result::is_ok));

    let member = setup.member(owner).unwrap();
    assert_eq!(member.total_capital, Money::from_major(150).unwrap());
}

#[test]
fn racing_accepts_of_one_investment_credit_once() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut setup = shared.handle();
    let owner = register(&mut setup, "twice@example.com");
    let id = setup
        .create_investment(owner, Money::from_major(100).unwrap(), "p")
        .unwrap()
        .id;

    let results = race(&shared, 4, move |_, ledger| {
        ledger.decide_investment(admin(), id, InvestmentDecision::Accept)
    });

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::InvalidTransition { .. })))
        .count();
    assert_eq!((accepted, refused), (1, 3));
    assert_eq!(
        setup.member(owner).unwrap().total_capital,
        Money::from_major(100).unwrap()
    );
}

#[test]
fn strict_policy_never_overdraws_under_contention() {
    let shared = SharedLedger::new(LedgerOptions {
        withdrawal_policy: WithdrawalPolicy::Strict,
        ..LedgerOptions::default()
    });
    let mut setup = shared.handle();
    let owner = register(&mut setup, "strict@example.com");
    let investment = setup
        .create_investment(owner, Money::from_major(100).unwrap(), "p")
        .unwrap()
        .id;
    setup
        .decide_investment(admin(), investment, InvestmentDecision::Accept)
        .unwrap();
    let ids = [
        setup
            .request_withdrawal(owner, Money::from_major(60).unwrap())
            .unwrap()
            .id,
        setup
            .request_withdrawal(owner, Money::from_major(60).unwrap())
            .unwrap()
            .id,
    ];

    let results = race(&shared, 2, move |i, ledger| {
        ledger.decide_withdrawal(admin(), ids[i], WithdrawalDecision::Approve)
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(LedgerError::InsufficientBalance { available, .. })
            if *available == Money::from_major(40).unwrap()
    )));
    assert_eq!(
        setup.member(owner).unwrap().total_capital,
        Money::from_major(40).unwrap()
    );
}

#[test]
fn concurrent_accruals_are_not_lost() {
    let shared = SharedLedger::new(LedgerOptions::default());
    let mut setup = shared.handle();
    let owner = register(&mut setup, "accrue@example.com");

    let results = race(&shared, 8, move |i, ledger| {
        ledger.accrue_returns(admin(), owner, Money::from_major(i as i64 + 1).unwrap())
    });
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(
        setup.member(owner).unwrap().total_returns,
        Money::from_major(36).unwrap()
    );
}
