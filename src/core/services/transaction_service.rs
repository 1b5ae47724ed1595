//! Commands that mutate the transaction store.

use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{LedgerState, Transaction, TransactionFilter};
use crate::errors::{LedgerError, LedgerResult};

/// Provides validated mutations for ledger transactions, budget, and filter.
///
/// Every command either fully applies or leaves the ledger untouched.
pub struct TransactionService;

impl TransactionService {
    /// Appends a new transaction and returns its identifier.
    pub fn add(ledger: &mut LedgerState, transaction: Transaction) -> LedgerResult<Uuid> {
        transaction.validate()?;
        if ledger.contains(transaction.id) {
            return Err(LedgerError::validation(format!(
                "transaction id {} is already in use",
                transaction.id
            )));
        }
        ensure_affordable(&transaction, ledger.balance_with(&transaction)?)?;

        let id = transaction.id;
        ledger.push_transaction(transaction)?;
        debug!(%id, balance = %ledger.current_balance(), "transaction added");
        Ok(id)
    }

    /// Replaces the stored transaction sharing `transaction.id`, returning the prior value.
    pub fn edit(ledger: &mut LedgerState, transaction: Transaction) -> LedgerResult<Transaction> {
        transaction.validate()?;
        if !ledger.contains(transaction.id) {
            warn!(id = %transaction.id, "edit rejected for unknown transaction");
            return Err(LedgerError::TransactionNotFound(transaction.id));
        }
        ensure_affordable(&transaction, ledger.balance_with(&transaction)?)?;

        let id = transaction.id;
        let previous = ledger
            .replace_transaction(transaction)?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        debug!(%id, balance = %ledger.current_balance(), "transaction edited");
        Ok(previous)
    }

    /// Removes the transaction identified by `id`; absent ids are a no-op.
    pub fn delete(ledger: &mut LedgerState, id: Uuid) -> LedgerResult<Option<Transaction>> {
        let removed = ledger.remove_transaction(id)?;
        match &removed {
            Some(_) => debug!(%id, balance = %ledger.current_balance(), "transaction deleted"),
            None => debug!(%id, "delete ignored for unknown transaction"),
        }
        Ok(removed)
    }

    /// Re-baselines the ledger on `amount`; the balance is re-derived from it.
    pub fn set_total_budget(ledger: &mut LedgerState, amount: Decimal) -> LedgerResult<()> {
        ledger.set_total_budget(amount)?;
        debug!(budget = %amount, balance = %ledger.current_balance(), "total budget set");
        Ok(())
    }

    pub fn set_filter(ledger: &mut LedgerState, filter: TransactionFilter) {
        ledger.set_filter(filter);
        debug!(?filter, "filter replaced");
    }
}

/// An expense may spend the balance down to zero but not below it.
fn ensure_affordable(transaction: &Transaction, projected: Decimal) -> LedgerResult<()> {
    if transaction.is_expense() && projected < Decimal::ZERO {
        warn!(
            id = %transaction.id,
            amount = %transaction.amount,
            %projected,
            "expense rejected"
        );
        return Err(LedgerError::BusinessRule(
            "expense exceeds current balance".into(),
        ));
    }
    Ok(())
}
