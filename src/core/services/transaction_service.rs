//! Write boundary for transactions.

use tracing::{info, warn};

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::{Transaction, TransactionDraft};
use crate::storage::ExpenseBackend;

/// Validated CRUD helpers in front of an [`ExpenseBackend`].
pub struct TransactionService;

impl TransactionService {
    /// Validates `draft` and stores it, returning the record with its assigned id.
    pub fn add(backend: &dyn ExpenseBackend, draft: TransactionDraft) -> ServiceResult<Transaction> {
        if let Err(err) = draft.validate() {
            warn!(error = %err, "rejected transaction draft");
            return Err(err.into());
        }
        let stored = backend.add_transaction(draft)?;
        info!(id = %stored.id, kind = %stored.kind, "transaction added");
        Ok(stored)
    }

    /// Replaces the stored record carrying `transaction.id`.
    pub fn update(
        backend: &dyn ExpenseBackend,
        transaction: Transaction,
    ) -> ServiceResult<Transaction> {
        if let Err(err) = transaction.validate() {
            warn!(id = %transaction.id, error = %err, "rejected transaction update");
            return Err(err.into());
        }
        Ok(backend.update_transaction(transaction)?)
    }

    pub fn delete(backend: &dyn ExpenseBackend, id: &str) -> ServiceResult<()> {
        if id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "transaction id must not be empty".into(),
            ));
        }
        backend.delete_transaction(id)?;
        info!(id, "transaction deleted");
        Ok(())
    }

    /// Transactions owned by `owner_id`, newest first.
    pub fn list(backend: &dyn ExpenseBackend, owner_id: &str) -> ServiceResult<Vec<Transaction>> {
        Ok(backend.fetch_transactions(owner_id)?)
    }
}
