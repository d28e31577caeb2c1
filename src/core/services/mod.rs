pub mod summary_service;
pub mod transaction_service;

pub use summary_service::{
    CategoryTotal, CategoryTotals, MonthlyTotal, SkippedRecord, StatsReport, SummaryService,
    Totals,
};
pub use transaction_service::TransactionService;

use crate::domain::InvalidTransaction;
use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<InvalidTransaction> for ServiceError {
    fn from(err: InvalidTransaction) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}
