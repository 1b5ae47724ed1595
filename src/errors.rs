use thiserror::Error;
use uuid::Uuid;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type that captures ledger command and export failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Rule violated: {0}")]
    BusinessRule(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    /// Returns `true` for errors raised by malformed command input.
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_business_rule(&self) -> bool {
        matches!(self, LedgerError::BusinessRule(_))
    }
}
