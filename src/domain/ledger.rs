//! In-memory ledger state and its balance invariant.

use std::{
    iter,
    sync::atomic::{AtomicU64, Ordering},
};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{
        filter::TransactionFilter,
        transaction::{Transaction, TransactionKind},
    },
    errors::{LedgerError, LedgerResult},
};

// Shared by every ledger in the process, so a revision names one snapshot even
// across states branched from the same base.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Transactions, budget baseline, and active filter for one session.
///
/// `current_balance` is always `total_budget + Σincome − Σexpense`. Every
/// mutation derives the new totals with checked arithmetic before changing
/// anything, then takes a fresh `revision`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LedgerState {
    transactions: Vec<Transaction>,
    total_budget: Decimal,
    total_income: Decimal,
    total_expenses: Decimal,
    current_balance: Decimal,
    filter: TransactionFilter,
    revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Totals {
    income: Decimal,
    expenses: Decimal,
    balance: Decimal,
}

impl Totals {
    /// Per-category and per-date sums are bounded by `income` and `expenses`,
    /// so a state that derives here cannot overflow in any aggregate.
    fn derive<'a, I>(total_budget: Decimal, transactions: I) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let (mut income, mut expenses) = (Decimal::ZERO, Decimal::ZERO);
        for txn in transactions {
            let sum = match txn.kind {
                TransactionKind::Income => &mut income,
                TransactionKind::Expense => &mut expenses,
            };
            *sum = sum.checked_add(txn.amount).ok_or_else(out_of_range)?;
        }
        let balance = total_budget
            .checked_add(income)
            .and_then(|partial| partial.checked_sub(expenses))
            .ok_or_else(out_of_range)?;
        Ok(Self {
            income,
            expenses,
            balance,
        })
    }
}

fn out_of_range() -> LedgerError {
    LedgerError::validation("amount out of range")
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(total_budget: Decimal) -> Self {
        Self {
            total_budget,
            current_balance: total_budget,
            revision: next_revision(),
            ..Self::default()
        }
    }

    /// Transactions in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn total_budget(&self) -> Decimal {
        self.total_budget
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    pub fn current_balance(&self) -> Decimal {
        self.current_balance
    }

    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    /// Opaque snapshot token. Two states with equal revisions hold equal data.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.transaction(id).is_some()
    }

    /// Balance the ledger would hold if `transaction` were stored, replacing
    /// any transaction with the same id.
    pub fn balance_with(&self, transaction: &Transaction) -> LedgerResult<Decimal> {
        let totals = match self.position(transaction.id) {
            Some(index) => self.derive_replacing(index, transaction)?,
            None => Totals::derive(
                self.total_budget,
                self.transactions.iter().chain(iter::once(transaction)),
            )?,
        };
        Ok(totals.balance)
    }

    /// Checks the stored totals against a fresh derivation.
    pub fn reconciles(&self) -> bool {
        Totals::derive(self.total_budget, &self.transactions)
            .map_or(false, |totals| totals == self.totals())
    }

    pub(crate) fn push_transaction(&mut self, transaction: Transaction) -> LedgerResult<()> {
        let totals = Totals::derive(
            self.total_budget,
            self.transactions.iter().chain(iter::once(&transaction)),
        )?;
        self.transactions.push(transaction);
        self.commit(totals);
        Ok(())
    }

    /// Swaps the stored transaction sharing `transaction.id`, returning the old value.
    pub(crate) fn replace_transaction(
        &mut self,
        transaction: Transaction,
    ) -> LedgerResult<Option<Transaction>> {
        let Some(index) = self.position(transaction.id) else {
            return Ok(None);
        };
        let totals = self.derive_replacing(index, &transaction)?;
        let previous = std::mem::replace(&mut self.transactions[index], transaction);
        self.commit(totals);
        Ok(Some(previous))
    }

    pub(crate) fn remove_transaction(&mut self, id: Uuid) -> LedgerResult<Option<Transaction>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let totals = Totals::derive(
            self.total_budget,
            self.transactions
                .iter()
                .enumerate()
                .filter(|(position, _)| *position != index)
                .map(|(_, txn)| txn),
        )?;
        let removed = self.transactions.remove(index);
        self.commit(totals);
        Ok(Some(removed))
    }

    pub(crate) fn set_total_budget(&mut self, amount: Decimal) -> LedgerResult<()> {
        let totals = Totals::derive(amount, &self.transactions)?;
        self.total_budget = amount;
        self.commit(totals);
        Ok(())
    }

    pub(crate) fn set_filter(&mut self, filter: TransactionFilter) {
        self.filter = filter;
        self.revision = next_revision();
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.transactions.iter().position(|txn| txn.id == id)
    }

    fn derive_replacing(&self, index: usize, transaction: &Transaction) -> LedgerResult<Totals> {
        Totals::derive(
            self.total_budget,
            self.transactions
                .iter()
                .enumerate()
                .map(|(position, txn)| if position == index { transaction } else { txn }),
        )
    }

    fn totals(&self) -> Totals {
        Totals {
            income: self.total_income,
            expenses: self.total_expenses,
            balance: self.current_balance,
        }
    }

    fn commit(&mut self, totals: Totals) {
        self.total_income = totals.income;
        self.total_expenses = totals.expenses;
        self.current_balance = totals.balance;
        self.revision = next_revision();
    }
}
