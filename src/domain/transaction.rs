use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::category::Category,
    errors::{LedgerError, LedgerResult},
};

/// Direction of a transaction relative to the balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(LedgerError::validation(format!(
                "unknown transaction type `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
    pub description: String,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: Category,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            category,
            date,
            description: description.into(),
        }
    }

    pub fn income(
        amount: Decimal,
        category: Category,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Income, amount, category, date, description)
    }

    pub fn expense(
        amount: Decimal,
        category: Category,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Expense, amount, category, date, description)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Signed contribution of this transaction to the balance.
    pub fn balance_effect(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Checks the field-level rules every stored transaction must satisfy.
    pub fn validate(&self) -> LedgerResult<()> {
        let mut problems = Vec::new();
        if self.amount <= Decimal::ZERO {
            problems.push("amount must be greater than 0");
        }
        if self.description.trim().is_empty() {
            problems.push("description is required");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(problems.join("; ")))
        }
    }
}

/// Unvalidated transaction payload as collected by an entry form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            kind,
            amount,
            category: None,
            date: None,
            description: String::new(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validates the draft and builds a transaction with a fresh identifier.
    pub fn into_transaction(self) -> LedgerResult<Transaction> {
        self.build(Uuid::new_v4())
    }

    /// Validates the draft and builds a replacement for the transaction `id`.
    pub fn into_replacement(self, id: Uuid) -> LedgerResult<Transaction> {
        self.build(id)
    }

    fn build(self, id: Uuid) -> LedgerResult<Transaction> {
        let mut problems = Vec::new();
        if self.amount <= Decimal::ZERO {
            problems.push("amount must be greater than 0");
        }
        if self.category.is_none() {
            problems.push("category is required");
        }
        if self.date.is_none() {
            problems.push("date is required");
        }
        if self.description.trim().is_empty() {
            problems.push("description is required");
        }
        match (self.category, self.date) {
            (Some(category), Some(date)) if problems.is_empty() => Ok(Transaction {
                id,
                kind: self.kind,
                amount: self.amount,
                category,
                date,
                description: self.description,
            }),
            _ => Err(LedgerError::Validation(problems.join("; "))),
        }
    }
}
