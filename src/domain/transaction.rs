//! Income and expense records owned by a single user.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TransactionId = String;
pub type UserId = String;

/// Direction of a transaction's contribution to the balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Reasons a record is refused at the write boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidTransaction {
    #[error("amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("transaction has no owner")]
    MissingOwner,
}

/// A transaction that has not been assigned an identifier yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDraft {
    pub owner_id: UserId,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn new(
        owner_id: impl Into<UserId>,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
            category: category.into(),
            amount,
            note: None,
            occurred_at,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn validate(&self) -> Result<(), InvalidTransaction> {
        validate_fields(&self.owner_id, &self.category, self.amount)
    }

    /// Promotes the draft into a stored record under `id`.
    pub fn into_transaction(self, id: impl Into<TransactionId>) -> Transaction {
        Transaction {
            id: id.into(),
            owner_id: self.owner_id,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            note: self.note,
            occurred_at: self.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: UserId,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn validate(&self) -> Result<(), InvalidTransaction> {
        validate_fields(&self.owner_id, &self.category, self.amount)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Calendar date of the transaction in UTC.
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    /// True when the transaction falls in the same calendar month as `anchor`.
    pub fn in_month_of(&self, anchor: NaiveDate) -> bool {
        let date = self.date();
        date.year() == anchor.year() && date.month() == anchor.month()
    }
}

fn validate_fields(owner_id: &str, category: &str, amount: f64) -> Result<(), InvalidTransaction> {
    if owner_id.trim().is_empty() {
        return Err(InvalidTransaction::MissingOwner);
    }
    if category.trim().is_empty() {
        return Err(InvalidTransaction::EmptyCategory);
    }
    if !amount.is_finite() {
        return Err(InvalidTransaction::NonFiniteAmount(amount));
    }
    if amount <= 0.0 {
        return Err(InvalidTransaction::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Orders transactions newest first by `occurred_at`, keeping encounter order for ties.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(amount: f64) -> TransactionDraft {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        TransactionDraft::new("user-1", TransactionKind::Expense, "Food", amount, at)
    }

    #[test]
    fn validate_rejects_non_positive_and_non_finite_amounts() {
        assert_eq!(
            draft(-10.0).validate(),
            Err(InvalidTransaction::NonPositiveAmount(-10.0))
        );
        assert_eq!(
            draft(0.0).validate(),
            Err(InvalidTransaction::NonPositiveAmount(0.0))
        );
        assert!(matches!(
            draft(f64::NAN).validate(),
            Err(InvalidTransaction::NonFiniteAmount(_))
        ));
        assert!(matches!(
            draft(f64::INFINITY).validate(),
            Err(InvalidTransaction::NonFiniteAmount(_))
        ));
        assert!(draft(10.0).validate().is_ok());
    }

    #[test]
    fn validate_requires_owner_and_category() {
        let mut missing_owner = draft(5.0);
        missing_owner.owner_id = "  ".into();
        assert_eq!(missing_owner.validate(), Err(InvalidTransaction::MissingOwner));

        let mut missing_category = draft(5.0);
        missing_category.category = String::new();
        assert_eq!(
            missing_category.validate(),
            Err(InvalidTransaction::EmptyCategory)
        );
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
    }

    #[test]
    fn in_month_of_compares_year_and_month() {
        let txn = draft(1.0).into_transaction("t1");
        assert!(txn.in_month_of(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        assert!(!txn.in_month_of(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()));
        assert!(!txn.in_month_of(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()));
    }

    #[test]
    fn sort_newest_first_orders_by_date_descending() {
        let older = draft(1.0).into_transaction("old");
        let mut newer = draft(2.0).into_transaction("new");
        newer.occurred_at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let mut list = vec![older, newer];
        sort_newest_first(&mut list);
        assert_eq!(list[0].id, "new");
    }
}
