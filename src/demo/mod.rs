//! State for the single-page demo: a caller-owned list with reset-to-defaults.

use std::sync::Arc;

use crate::{
    core::{
        services::{CategoryTotals, ServiceError, ServiceResult, SummaryService, Totals},
        time::Clock,
    },
    domain::{Transaction, TransactionDraft, TransactionKind},
};

pub const DEMO_OWNER: &str = "demo";
const FIRST_FREE_ID: u32 = 5;
const ADDED_NOTE: &str = "Added in demo";

/// The demo's transaction list plus its id counter.
pub struct DemoLedger {
    transactions: Vec<Transaction>,
    next_id: u32,
    clock: Arc<dyn Clock>,
}

impl DemoLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions: default_transactions(clock.as_ref()),
            next_id: FIRST_FREE_ID,
            clock,
        }
    }

    /// Appends a transaction with the next `t<n>` id.
    pub fn add(
        &mut self,
        kind: TransactionKind,
        category: &str,
        amount: f64,
    ) -> ServiceResult<&Transaction> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ServiceError::InvalidInput("Enter a positive amount.".into()));
        }
        let draft = TransactionDraft::new(DEMO_OWNER, kind, category, amount, self.clock.now())
            .with_note(ADDED_NOTE);
        draft.validate()?;
        let id = format!("t{}", self.next_id);
        self.next_id += 1;
        self.transactions.push(draft.into_transaction(id));
        Ok(&self.transactions[self.transactions.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        Some(self.transactions.remove(index))
    }

    /// Restores the four default transactions and the id counter.
    pub fn reset(&mut self) {
        self.transactions = default_transactions(self.clock.as_ref());
        self.next_id = FIRST_FREE_ID;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Display order: most recently added first.
    pub fn transactions_newest_first(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev()
    }

    pub fn totals(&self) -> Totals {
        SummaryService::compute_totals(&self.transactions)
    }

    pub fn expenses_by_category(&self) -> CategoryTotals {
        SummaryService::group_expenses_by_category(&self.transactions)
    }
}

/// The demo's starting transactions, stamped with `clock`'s current time.
pub fn default_transactions(clock: &dyn Clock) -> Vec<Transaction> {
    let now = clock.now();
    [
        ("t1", TransactionKind::Income, "Other", 1500.0, "Demo salary"),
        ("t2", TransactionKind::Expense, "Rent", 650.0, "Demo rent"),
        ("t3", TransactionKind::Expense, "Food", 120.0, "Groceries"),
        ("t4", TransactionKind::Expense, "Transport", 55.0, "Fuel"),
    ]
    .into_iter()
    .map(|(id, kind, category, amount, note)| {
        TransactionDraft::new(DEMO_OWNER, kind, category, amount, now)
            .with_note(note)
            .into_transaction(id)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use chrono::{TimeZone, Utc};

    fn ledger() -> DemoLedger {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
        DemoLedger::new(Arc::new(clock))
    }

    #[test]
    fn defaults_produce_expected_balance() {
        let ledger = ledger();
        let totals = ledger.totals();
        assert_eq!(totals.income_total, 1500.0);
        assert_eq!(totals.expense_total, 825.0);
        assert_eq!(totals.balance, 675.0);
        let labels: Vec<String> = ledger
            .expenses_by_category()
            .iter()
            .map(|entry| entry.category.clone())
            .collect();
        assert_eq!(labels, vec!["Rent", "Food", "Transport"]);
    }

    #[test]
    fn add_rejects_non_positive_amounts() {
        let mut ledger = ledger();
        for amount in [-10.0, 0.0, f64::NAN] {
            let err = ledger
                .add(TransactionKind::Expense, "Food", amount)
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid input: Enter a positive amount.");
        }
        assert_eq!(ledger.transactions().len(), 4);
    }

    #[test]
    fn add_uses_sequential_ids_and_reset_restores_defaults() {
        let mut ledger = ledger();
        let id = ledger
            .add(TransactionKind::Expense, "Utilities", 40.0)
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "t5");
        assert_eq!(ledger.transactions_newest_first().next().unwrap().id, "t5");
        ledger.add(TransactionKind::Income, "Other", 10.0).unwrap();
        assert_eq!(ledger.transactions().len(), 6);

        ledger.reset();
        assert_eq!(ledger.transactions().len(), 4);
        let again = ledger
            .add(TransactionKind::Expense, "Food", 1.0)
            .unwrap()
            .id
            .clone();
        assert_eq!(again, "t5");
    }

    #[test]
    fn add_then_remove_restores_totals() {
        let mut ledger = ledger();
        let before = ledger.totals();
        let id = ledger
            .add(TransactionKind::Expense, "Food", 10.0)
            .unwrap()
            .id
            .clone();
        ledger.remove(&id).unwrap();
        assert_eq!(ledger.totals(), before);
        assert!(ledger.remove(&id).is_none());
    }
}
