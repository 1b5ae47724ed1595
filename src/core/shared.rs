//! Single-writer handle for sharing one ledger between threads.

use std::sync::{Arc, PoisonError, RwLock};

use crate::core::command::{execute, LedgerCommand};
use crate::domain::LedgerState;
use crate::errors::LedgerResult;

/// Cloneable handle where each command runs under one exclusive lock.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<LedgerState>>,
}

impl SharedLedger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn dispatch(&self, command: LedgerCommand) -> LedgerResult<()> {
        let name = command.name();
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let result = execute(&mut guard, command);
        if let Err(err) = &result {
            tracing::warn!(command = name, %err, "command rejected");
        }
        result
    }

    /// Runs a read-only query against the current snapshot.
    pub fn read<T>(&self, query: impl FnOnce(&LedgerState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        query(&guard)
    }

    pub fn snapshot(&self) -> LedgerState {
        self.read(LedgerState::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::SummaryService;
    use crate::domain::{Category, Transaction};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::thread;

    #[test]
    fn concurrent_dispatch_keeps_balance_reconciled() {
        let ledger = SharedLedger::default();
        ledger
            .dispatch(LedgerCommand::SetTotalBudget(dec!(0)))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let handle = ledger.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let txn = Transaction::income(dec!(1), Category::Other, date, "Tip");
                        handle.dispatch(LedgerCommand::AddTransaction(txn)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.read(SummaryService::total_income), dec!(100));
        assert!(ledger.read(LedgerState::reconciles));
        assert_eq!(ledger.snapshot().transaction_count(), 100);
    }

    #[test]
    fn rejected_overflow_keeps_lock_healthy() {
        let ledger = SharedLedger::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for description in ["first", "second"] {
            let txn = Transaction::income(Decimal::MAX, Category::Other, date, description);
            let _ = ledger.dispatch(LedgerCommand::AddTransaction(txn));
        }

        assert!(!ledger.inner.is_poisoned());
        let state = ledger.snapshot();
        assert_eq!(state.transaction_count(), 1);
        assert_eq!(state.current_balance(), Decimal::MAX);
        assert!(state.reconciles());
    }
}
