//! Tagged ledger commands and the pure reducer that applies them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::services::TransactionService;
use crate::domain::{LedgerState, Transaction, TransactionFilter};
use crate::errors::LedgerResult;

/// Every mutation the presentation layer may request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum LedgerCommand {
    AddTransaction(Transaction),
    EditTransaction(Transaction),
    DeleteTransaction(Uuid),
    SetTotalBudget(Decimal),
    SetFilter(TransactionFilter),
}

impl LedgerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::AddTransaction(_) => "add_transaction",
            LedgerCommand::EditTransaction(_) => "edit_transaction",
            LedgerCommand::DeleteTransaction(_) => "delete_transaction",
            LedgerCommand::SetTotalBudget(_) => "set_total_budget",
            LedgerCommand::SetFilter(_) => "set_filter",
        }
    }
}

/// Applies `command` in place. On error the ledger is unchanged.
pub fn execute(ledger: &mut LedgerState, command: LedgerCommand) -> LedgerResult<()> {
    match command {
        LedgerCommand::AddTransaction(txn) => TransactionService::add(ledger, txn).map(|_| ()),
        LedgerCommand::EditTransaction(txn) => TransactionService::edit(ledger, txn).map(|_| ()),
        LedgerCommand::DeleteTransaction(id) => TransactionService::delete(ledger, id).map(|_| ()),
        LedgerCommand::SetTotalBudget(amount) => {
            TransactionService::set_total_budget(ledger, amount)
        }
        LedgerCommand::SetFilter(filter) => {
            TransactionService::set_filter(ledger, filter);
            Ok(())
        }
    }
}

/// Pure `(state, command) -> state'` form of [`execute`].
///
/// Each successful call yields a state with a revision of its own, so states
/// branched from one base can share a `SummaryCache`.
pub fn apply(state: &LedgerState, command: LedgerCommand) -> LedgerResult<LedgerState> {
    let mut next = state.clone();
    execute(&mut next, command)?;
    Ok(next)
}

/// Folds `commands` over `state`, stopping at the first failure.
pub fn replay<I>(state: &LedgerState, commands: I) -> LedgerResult<LedgerState>
where
    I: IntoIterator<Item = LedgerCommand>,
{
    commands
        .into_iter()
        .try_fold(state.clone(), |mut next, command| {
            execute(&mut next, command)?;
            Ok(next)
        })
}
