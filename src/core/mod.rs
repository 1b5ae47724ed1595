pub mod command;
pub mod services;
pub mod shared;

pub use command::{apply, execute, replay, LedgerCommand};
pub use shared::SharedLedger;
