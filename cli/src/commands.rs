//! Subcommands and their mapping onto ledger operations.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;

use capital_ledger::Ledger;
use capital_types::{
    Caller, InvestmentDecision, InvestmentId, JoinStatus, MemberId, Money, WithdrawalDecision,
    WithdrawalId,
};

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Register a new member
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Grant the administrator flag
        #[arg(long)]
        grant_admin: bool,
    },

    /// Submit a pending investment on behalf of the caller
    Invest {
        #[arg(long, value_parser = Money::parse)]
        amount: Money,
        /// Reference to the externally stored proof of payment
        #[arg(long)]
        proof: String,
    },

    /// File a pending withdrawal request on behalf of the caller
    Withdraw {
        #[arg(long, value_parser = Money::parse)]
        amount: Money,
    },

    /// Accept or reject a pending investment (admin)
    DecideInvestment {
        id: i64,
        #[arg(value_parser = InvestmentDecision::parse)]
        decision: InvestmentDecision,
    },

    /// Approve or reject a pending withdrawal request (admin)
    DecideWithdrawal {
        id: i64,
        #[arg(value_parser = WithdrawalDecision::parse)]
        decision: WithdrawalDecision,
    },

    /// Add a signed amount to a member's accrued returns (admin)
    Accrue {
        member: i64,
        #[arg(long, value_parser = Money::parse, allow_negative_numbers = true)]
        amount: Money,
    },

    /// Record the informational returns figure on one investment (admin)
    SetGeneratedReturns {
        id: i64,
        #[arg(long, value_parser = Money::parse, allow_negative_numbers = true)]
        amount: Money,
    },

    /// Review a member's join request (admin)
    SetJoinStatus {
        member: i64,
        #[arg(value_parser = JoinStatus::parse)]
        status: JoinStatus,
    },

    /// Show a member with all their investments and withdrawals
    Statement {
        /// Defaults to the caller
        member: Option<i64>,
    },

    /// Show a member's accepted investments and balances
    AcceptedInvestments {
        /// Defaults to the caller
        member: Option<i64>,
    },

    /// Platform-wide investment totals
    Totals,

    /// Platform-wide dashboard figures
    Analytics,

    /// List every member (admin)
    ListMembers,

    /// List every investment (admin)
    ListInvestments,

    /// List every withdrawal request (admin)
    ListWithdrawals,
}

fn json(value: &impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

impl Command {
    pub(crate) fn run(self, ledger: &mut Ledger, caller: Caller) -> Result<Value> {
        let subject = |member: Option<i64>| member.map_or(caller.member_id(), MemberId::new);

        match self {
            Command::Register {
                name,
                email,
                grant_admin,
            } => json(&ledger.register_member(&name, &email, grant_admin)?),
            Command::Invest { amount, proof } => {
                json(&ledger.create_investment(caller.member_id(), amount, &proof)?)
            }
            Command::Withdraw { amount } => {
                json(&ledger.request_withdrawal(caller.member_id(), amount)?)
            }
            Command::DecideInvestment { id, decision } => {
                json(&ledger.decide_investment(caller, InvestmentId::new(id), decision)?)
            }
            Command::DecideWithdrawal { id, decision } => {
                json(&ledger.decide_withdrawal(caller, WithdrawalId::new(id), decision)?)
            }
            Command::Accrue { member, amount } => {
                json(&ledger.accrue_returns(caller, MemberId::new(member), amount)?)
            }
            Command::SetGeneratedReturns { id, amount } => {
                json(&ledger.record_generated_returns(caller, InvestmentId::new(id), amount)?)
            }
            Command::SetJoinStatus { member, status } => {
                json(&ledger.set_join_status(caller, MemberId::new(member), status)?)
            }
            Command::Statement { member } => json(&ledger.statement(caller, subject(member))?),
            Command::AcceptedInvestments { member } => {
                json(&ledger.accepted_investments(caller, subject(member))?)
            }
            Command::Totals => json(&ledger.platform_totals()?),
            Command::Analytics => json(&ledger.analytics()?),
            Command::ListMembers => json(&ledger.list_members(caller)?),
            Command::ListInvestments => json(&ledger.list_investments(caller)?),
            Command::ListWithdrawals => json(&ledger.list_withdrawals(caller)?),
        }
    }
}
