pub mod category;
pub mod filter;
pub mod ledger;
pub mod transaction;

pub use category::Category;
pub use filter::TransactionFilter;
pub use ledger::LedgerState;
pub use transaction::{Transaction, TransactionDraft, TransactionKind};
