pub mod export_service;
pub mod summary_service;
pub mod transaction_service;

pub use export_service::{ExportRequest, ExportRow, ExportService, ExportType};
pub use summary_service::{
    sort_transactions, CategoryTotal, IncomeExpenses, LedgerSummary, SortField, SortOption,
    SortOrder, SummaryCache, SummaryOptions, SummaryService, TrendPoint,
};
pub use transaction_service::TransactionService;
