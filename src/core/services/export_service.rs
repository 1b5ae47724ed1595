//! Date-range export of transactions into flat report rows.

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Category, LedgerState, Transaction, TransactionKind};
use crate::errors::{LedgerError, LedgerResult};

pub const EXPORT_COLUMNS: [&str; 5] = ["Date", "Description", "Category", "Type", "Amount"];
pub const DEFAULT_REPORT_PREFIX: &str = "Transactions_Report";
const REPORT_EXTENSION: &str = "csv";

/// Transaction type constraint for an export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    #[default]
    All,
    Income,
    Expense,
}

impl ExportType {
    pub fn matches(&self, kind: TransactionKind) -> bool {
        match self {
            ExportType::All => true,
            ExportType::Income => kind == TransactionKind::Income,
            ExportType::Expense => kind == TransactionKind::Expense,
        }
    }
}

impl From<TransactionKind> for ExportType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => ExportType::Income,
            TransactionKind::Expense => ExportType::Expense,
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportType::All => "all",
            ExportType::Income => "income",
            ExportType::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for ExportType {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ExportType::All),
            other => other.parse::<TransactionKind>().map(ExportType::from),
        }
    }
}

/// One flattened transaction; field order is the artifact's column order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Type")]
    pub kind: TransactionKind,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
}

impl From<&Transaction> for ExportRow {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn.date,
            description: txn.description.clone(),
            category: txn.category,
            kind: txn.kind,
            amount: txn.amount,
        }
    }
}

/// Export parameters as collected from a form, before validation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRequest {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub kind: ExportType,
}

impl ExportRequest {
    pub fn new(start: NaiveDate, end: NaiveDate, kind: ExportType) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            kind,
        }
    }

    /// Returns the validated inclusive range.
    pub fn range(&self) -> LedgerResult<(NaiveDate, NaiveDate)> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(LedgerError::validation(
                "please select both start and end dates",
            ));
        };
        ensure_ordered(start, end)?;
        Ok((start, end))
    }

    /// Entry forms require a concrete type even though the filter accepts `all`.
    pub fn ensure_specific_type(&self) -> LedgerResult<()> {
        if self.kind == ExportType::All {
            return Err(LedgerError::validation(
                "please select a specific transaction type",
            ));
        }
        Ok(())
    }
}

pub struct ExportService;

impl ExportService {
    /// Rows for every transaction dated within `[start, end]` whose type matches `kind`.
    pub fn export_range(
        transactions: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
        kind: ExportType,
    ) -> LedgerResult<Vec<ExportRow>> {
        ensure_ordered(start, end)?;
        let rows: Vec<ExportRow> = transactions
            .iter()
            .filter(|txn| txn.date >= start && txn.date <= end && kind.matches(txn.kind))
            .map(ExportRow::from)
            .collect();
        debug!(%start, %end, %kind, rows = rows.len(), "export range selected");
        Ok(rows)
    }

    pub fn export_request(
        ledger: &LedgerState,
        request: &ExportRequest,
    ) -> LedgerResult<Vec<ExportRow>> {
        let (start, end) = request.range()?;
        Self::export_range(ledger.transactions(), start, end, request.kind)
    }

    /// Artifact base name, e.g. `Transactions_Report_2024-01-01_to_2024-01-31`.
    pub fn report_name(prefix: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}_{}_to_{}",
            prefix,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }

    /// Writes a header row followed by `rows` as CSV.
    pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> LedgerResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(EXPORT_COLUMNS)?;
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(rows: &[ExportRow]) -> LedgerResult<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::write_csv(rows, &mut buffer)?;
        Ok(buffer)
    }

    /// Writes `<report_name>.csv` into `dir`, returning the file path.
    pub fn export_to_path(
        ledger: &LedgerState,
        request: &ExportRequest,
        prefix: &str,
        dir: &Path,
    ) -> LedgerResult<PathBuf> {
        let (start, end) = request.range()?;
        let rows = Self::export_range(ledger.transactions(), start, end, request.kind)?;
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "{}.{}",
            Self::report_name(prefix, start, end),
            REPORT_EXTENSION
        ));
        let file = fs::File::create(&path)?;
        Self::write_csv(&rows, file)?;
        info!(path = %path.display(), rows = rows.len(), "export written");
        Ok(path)
    }
}

fn ensure_ordered(start: NaiveDate, end: NaiveDate) -> LedgerResult<()> {
    if start > end {
        return Err(LedgerError::validation(
            "start date cannot be after end date",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn transactions() -> Vec<Transaction> {
        vec![
            Transaction::income(dec!(200), Category::Other, day(1), "Salary"),
            Transaction::expense(dec!(30), Category::Food, day(2), "Groceries"),
            Transaction::expense(dec!(15), Category::Transport, day(4), "Taxi"),
        ]
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let rows =
            ExportService::export_range(&transactions(), day(2), day(4), ExportType::All).unwrap();
        let descriptions: Vec<_> = rows.iter().map(|row| row.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Groceries", "Taxi"]);
    }

    #[test]
    fn single_day_range_is_accepted() {
        let rows =
            ExportService::export_range(&transactions(), day(1), day(1), ExportType::All).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = ExportService::export_range(&transactions(), day(3), day(1), ExportType::All)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn request_without_dates_is_rejected() {
        let request = ExportRequest {
            start: Some(day(1)),
            end: None,
            kind: ExportType::Income,
        };
        let err = ExportService::export_request(&LedgerState::new(), &request).unwrap_err();
        assert!(err.to_string().contains("start and end"), "{err}");
    }

    #[test]
    fn form_rule_rejects_all_but_filter_accepts_it() {
        let request = ExportRequest::new(day(1), day(4), ExportType::All);
        assert!(request.ensure_specific_type().is_err());
        assert!(ExportRequest::new(day(1), day(4), ExportType::Expense)
            .ensure_specific_type()
            .is_ok());
    }

    #[test]
    fn export_type_parses_form_values() {
        assert_eq!("ALL".parse::<ExportType>().unwrap(), ExportType::All);
        assert_eq!("expense".parse::<ExportType>().unwrap(), ExportType::Expense);
        assert!("transfer".parse::<ExportType>().is_err());
    }

    #[test]
    fn csv_has_fixed_column_order() {
        let rows =
            ExportService::export_range(&transactions(), day(1), day(2), ExportType::All).unwrap();
        let bytes = ExportService::to_csv_bytes(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Date,Description,Category,Type,Amount");
        assert_eq!(lines[1], "2024-01-01,Salary,Other,income,200");
        assert_eq!(lines[2], "2024-01-02,Groceries,Food,expense,30");
    }

    #[test]
    fn empty_export_still_writes_header() {
        let bytes = ExportService::to_csv_bytes(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Date,Description,Category,Type,Amount\n");
    }

    #[test]
    fn report_name_follows_convention() {
        assert_eq!(
            ExportService::report_name(DEFAULT_REPORT_PREFIX, day(1), day(31)),
            "Transactions_Report_2024-01-01_to_2024-01-31"
        );
    }
}
