use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        category::Category,
        transaction::{Transaction, TransactionKind},
    },
    errors::LedgerResult,
};

/// Type and category constraint narrowing which transactions a view considers.
///
/// Absent fields match everything; present fields are AND-ed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TransactionFilter {
    pub fn new(kind: Option<TransactionKind>, category: Option<Category>) -> Self {
        Self { kind, category }
    }

    pub fn by_kind(kind: TransactionKind) -> Self {
        Self::new(Some(kind), None)
    }

    pub fn by_category(category: Category) -> Self {
        Self::new(None, Some(category))
    }

    /// Builds a filter from raw form values, where an empty string means no constraint.
    pub fn parse(kind: &str, category: &str) -> LedgerResult<Self> {
        let kind = match kind.trim() {
            "" => None,
            value => Some(value.parse()?),
        };
        let category = match category.trim() {
            "" => None,
            value => Some(value.parse()?),
        };
        Ok(Self { kind, category })
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.category.is_none()
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.kind.map_or(true, |kind| transaction.kind == kind)
            && self
                .category
                .map_or(true, |category| transaction.category == category)
    }
}
