#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps an in-memory income/expense ledger whose balance always
//! reconciles with the budget, and derives summaries and exports from it.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod utils;

pub use crate::core::{LedgerCommand, SharedLedger};
pub use domain::{Category, LedgerState, Transaction, TransactionFilter, TransactionKind};
pub use errors::{LedgerError, LedgerResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
