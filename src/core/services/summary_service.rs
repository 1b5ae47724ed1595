//! Derived views over a ledger snapshot: totals, rankings, trends, and sorting.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::LedgerConfig;
use crate::domain::{Category, LedgerState, Transaction, TransactionFilter, TransactionKind};

pub const RECENT_LIMIT: usize = 5;
pub const TOP_CATEGORY_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct IncomeExpenses {
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOption {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortOption {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Mirrors a table header click: the same field flips, a new field starts ascending.
    pub fn toggle(self, field: SortField) -> Self {
        let order = if self.field == field && self.order == SortOrder::Ascending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        Self { field, order }
    }
}

/// Limits applied by the ranked and windowed views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub recent_limit: usize,
    pub top_categories_limit: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            recent_limit: RECENT_LIMIT,
            top_categories_limit: TOP_CATEGORY_LIMIT,
        }
    }
}

impl From<&LedgerConfig> for SummaryOptions {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            recent_limit: config.recent_limit,
            top_categories_limit: config.top_categories_limit,
        }
    }
}

/// Every aggregate for a single ledger revision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerSummary {
    pub revision: u64,
    pub total_budget: Decimal,
    pub current_balance: Decimal,
    pub income_expenses: IncomeExpenses,
    pub recent: Vec<Transaction>,
    pub top_categories: Vec<CategoryTotal>,
    pub expense_distribution: Vec<CategoryTotal>,
    pub spending_trends: Vec<TrendPoint>,
    pub income_trends: Vec<TrendPoint>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn total_income(ledger: &LedgerState) -> Decimal {
        ledger.total_income()
    }

    pub fn total_expenses(ledger: &LedgerState) -> Decimal {
        ledger.total_expenses()
    }

    pub fn current_balance(ledger: &LedgerState) -> Decimal {
        ledger.current_balance()
    }

    pub fn income_expenses(ledger: &LedgerState) -> IncomeExpenses {
        IncomeExpenses {
            income: Self::total_income(ledger),
            expenses: Self::total_expenses(ledger),
        }
    }

    /// Transactions matching the ledger's active filter, in insertion order.
    pub fn filtered_transactions(ledger: &LedgerState) -> Vec<&Transaction> {
        Self::filter_transactions(ledger, ledger.filter())
    }

    pub fn filter_transactions<'a>(
        ledger: &'a LedgerState,
        filter: &TransactionFilter,
    ) -> Vec<&'a Transaction> {
        ledger
            .transactions()
            .iter()
            .filter(|txn| filter.matches(txn))
            .collect()
    }

    pub fn recent_transactions(ledger: &LedgerState) -> &[Transaction] {
        Self::recent_transactions_with_limit(ledger, RECENT_LIMIT)
    }

    pub fn recent_transactions_with_limit(ledger: &LedgerState, limit: usize) -> &[Transaction] {
        let transactions = ledger.transactions();
        &transactions[transactions.len().saturating_sub(limit)..]
    }

    pub fn top_categories(ledger: &LedgerState) -> Vec<CategoryTotal> {
        Self::top_categories_with_limit(ledger, TOP_CATEGORY_LIMIT)
    }

    /// Highest expense categories, ties ordered by category name.
    pub fn top_categories_with_limit(ledger: &LedgerState, limit: usize) -> Vec<CategoryTotal> {
        let mut totals = Self::expense_distribution(ledger);
        totals.sort_by(|a, b| b.total.cmp(&a.total));
        totals.truncate(limit);
        totals
    }

    /// Per-category expense sums for categories with at least one expense, by name.
    pub fn expense_distribution(ledger: &LedgerState) -> Vec<CategoryTotal> {
        let mut sums: HashMap<Category, Decimal> = HashMap::new();
        for txn in ledger.transactions().iter().filter(|txn| txn.is_expense()) {
            *sums.entry(txn.category).or_default() += txn.amount;
        }
        let mut totals: Vec<CategoryTotal> = sums
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect();
        totals.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()));
        totals
    }

    pub fn spending_trends(ledger: &LedgerState) -> Vec<TrendPoint> {
        trends_for(ledger, TransactionKind::Expense)
    }

    pub fn income_trends(ledger: &LedgerState) -> Vec<TrendPoint> {
        trends_for(ledger, TransactionKind::Income)
    }

    pub fn summarize(ledger: &LedgerState, options: SummaryOptions) -> LedgerSummary {
        LedgerSummary {
            revision: ledger.revision(),
            total_budget: ledger.total_budget(),
            current_balance: ledger.current_balance(),
            income_expenses: Self::income_expenses(ledger),
            recent: Self::recent_transactions_with_limit(ledger, options.recent_limit).to_vec(),
            top_categories: Self::top_categories_with_limit(ledger, options.top_categories_limit),
            expense_distribution: Self::expense_distribution(ledger),
            spending_trends: Self::spending_trends(ledger),
            income_trends: Self::income_trends(ledger),
        }
    }
}

/// Stable in-place sort for display.
pub fn sort_transactions(transactions: &mut [&Transaction], option: SortOption) {
    transactions.sort_by(|a, b| {
        let ordering = compare_by(a, b, option.field);
        match option.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare_by(a: &Transaction, b: &Transaction, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Amount => a.amount.cmp(&b.amount),
        SortField::Category => a.category.as_str().cmp(b.category.as_str()),
        SortField::Description => a.description.cmp(&b.description),
    }
}

fn trends_for(ledger: &LedgerState, kind: TransactionKind) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for txn in ledger.transactions().iter().filter(|txn| txn.kind == kind) {
        *by_date.entry(txn.date).or_default() += txn.amount;
    }
    by_date
        .into_iter()
        .map(|(date, amount)| TrendPoint { date, amount })
        .collect()
}

/// Memoizes a [`LedgerSummary`] against the ledger revision.
///
/// Revisions are unique per snapshot, so one cache may serve several ledgers
/// or branches; it simply recomputes whenever the revision it sees changes.
#[derive(Debug, Default)]
pub struct SummaryCache {
    options: SummaryOptions,
    cached: Option<LedgerSummary>,
}

impl SummaryCache {
    pub fn new(options: SummaryOptions) -> Self {
        Self {
            options,
            cached: None,
        }
    }

    pub fn options(&self) -> SummaryOptions {
        self.options
    }

    /// Replaces the limits; the next [`summary`](Self::summary) recomputes.
    pub fn set_options(&mut self, options: SummaryOptions) {
        self.options = options;
        self.invalidate();
    }

    pub fn summary(&mut self, ledger: &LedgerState) -> &LedgerSummary {
        if self
            .cached
            .as_ref()
            .is_some_and(|summary| summary.revision != ledger.revision())
        {
            self.invalidate();
        }
        let options = self.options;
        self.cached.get_or_insert_with(|| {
            tracing::trace!(revision = ledger.revision(), "recomputing ledger summary");
            SummaryService::summarize(ledger, options)
        })
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{services::TransactionService, LedgerCommand};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_ledger() -> LedgerState {
        let mut ledger = LedgerState::with_budget(dec!(1000));
        let entries = [
            Transaction::income(dec!(500), Category::Other, day(3), "Salary"),
            Transaction::expense(dec!(40), Category::Food, day(2), "Groceries"),
            Transaction::expense(dec!(60), Category::Transport, day(2), "Fuel"),
            Transaction::expense(dec!(60), Category::Entertainment, day(1), "Cinema"),
            Transaction::expense(dec!(20), Category::Food, day(5), "Lunch"),
            Transaction::expense(dec!(10), Category::Rent, day(6), "Fee"),
        ];
        for txn in entries {
            TransactionService::add(&mut ledger, txn).unwrap();
        }
        ledger
    }

    #[test]
    fn top_categories_breaks_ties_by_name() {
        let ledger = sample_ledger();
        let top = SummaryService::top_categories(&ledger);
        let names: Vec<_> = top.iter().map(|entry| entry.category).collect();
        assert_eq!(
            names,
            vec![Category::Entertainment, Category::Food, Category::Transport]
        );
        assert!(top.iter().all(|entry| entry.total == dec!(60)));
    }

    #[test]
    fn recent_returns_last_five_in_insertion_order() {
        let ledger = sample_ledger();
        let recent = SummaryService::recent_transactions(&ledger);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].description, "Groceries");
        assert_eq!(recent[4].description, "Fee");
    }

    #[test]
    fn trends_are_grouped_and_chronological() {
        let ledger = sample_ledger();
        let spending = SummaryService::spending_trends(&ledger);
        let dates: Vec<_> = spending.iter().map(|point| point.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(5), day(6)]);
        assert_eq!(spending[1].amount, dec!(100));
        assert_eq!(SummaryService::income_trends(&ledger).len(), 1);
    }

    #[test]
    fn sort_by_amount_descending_is_stable() {
        let ledger = sample_ledger();
        let mut rows = SummaryService::filtered_transactions(&ledger);
        sort_transactions(
            &mut rows,
            SortOption::new(SortField::Amount, SortOrder::Descending),
        );
        let descriptions: Vec<_> = rows.iter().map(|txn| txn.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["Salary", "Fuel", "Cinema", "Groceries", "Lunch", "Fee"]
        );
    }

    #[test]
    fn toggle_flips_order_on_same_field() {
        let option = SortOption::default().toggle(SortField::Date);
        assert_eq!(option.order, SortOrder::Descending);
        let option = option.toggle(SortField::Category);
        assert_eq!(option, SortOption::new(SortField::Category, SortOrder::Ascending));
    }

    #[test]
    fn cache_recomputes_only_after_mutation() {
        let mut ledger = sample_ledger();
        let mut cache = SummaryCache::new(SummaryOptions::default());
        let first = cache.summary(&ledger).clone();
        assert_eq!(cache.summary(&ledger), &first);

        TransactionService::set_total_budget(&mut ledger, dec!(0)).unwrap();
        let refreshed = cache.summary(&ledger);
        assert_ne!(refreshed.revision, first.revision);
        assert_eq!(refreshed.current_balance, dec!(310));
    }

    #[test]
    fn changing_options_discards_cached_summary() {
        let ledger = sample_ledger();
        let mut cache = SummaryCache::default();
        assert_eq!(cache.summary(&ledger).recent.len(), 5);

        cache.set_options(SummaryOptions {
            recent_limit: 2,
            ..cache.options()
        });
        let summary = cache.summary(&ledger);
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.recent[1].description, "Fee");
    }

    #[test]
    fn branches_from_one_base_get_their_own_summaries() {
        let base = sample_ledger();
        let mut cache = SummaryCache::default();
        let low = crate::core::apply(&base, LedgerCommand::SetTotalBudget(dec!(100))).unwrap();
        let high = crate::core::apply(&base, LedgerCommand::SetTotalBudget(dec!(200))).unwrap();

        assert_ne!(low.revision(), high.revision());
        assert_eq!(cache.summary(&low).current_balance, dec!(410));
        assert_eq!(cache.summary(&high).current_balance, dec!(510));
        assert_eq!(cache.summary(&low).total_budget, dec!(100));
    }
}
