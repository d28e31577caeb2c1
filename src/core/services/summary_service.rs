//! Derived financial views over a transaction collection.
//!
//! Every function here is a pure, single-pass reduction over a caller-owned
//! slice. Nothing is cached between calls.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{InvalidTransaction, Transaction, TransactionId};

use super::{ServiceError, ServiceResult};

/// Window length used by the statistics view's trend chart.
pub const DEFAULT_TREND_MONTHS: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income_total: f64,
    pub expense_total: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Expense totals keyed by category label, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals(Vec<CategoryTotal>);

impl CategoryTotals {
    fn add(&mut self, category: &str, amount: f64) {
        match self.0.iter_mut().find(|entry| entry.category == category) {
            Some(entry) => entry.total += amount,
            None => self.0.push(CategoryTotal {
                category: category.to_string(),
                total: amount,
            }),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.total)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// An empty grouping means there is nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every category, i.e. the pie chart's full circle.
    pub fn grand_total(&self) -> f64 {
        self.0.iter().map(|entry| entry.total).sum()
    }

    /// Each category's share of the grand total, in `[0, 1]`.
    pub fn shares(&self) -> Vec<(&str, f64)> {
        let total = self.grand_total();
        if total <= 0.0 {
            return Vec::new();
        }
        self.0
            .iter()
            .map(|entry| (entry.category.as_str(), entry.total / total))
            .collect()
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = &'a CategoryTotal;
    type IntoIter = std::slice::Iter<'a, CategoryTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One point on the trailing monthly expense axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: f64,
}

/// A record left out of aggregation because it failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub id: TransactionId,
    pub reason: String,
}

/// Everything the statistics view renders, computed in one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub totals: Totals,
    pub by_category: CategoryTotals,
    pub monthly: Vec<MonthlyTotal>,
    pub current_month_expense: f64,
    pub skipped: Vec<SkippedRecord>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn compute_totals(transactions: &[Transaction]) -> Totals {
        let (income_total, expense_total) =
            transactions
                .iter()
                .fold((0.0, 0.0), |(income, expense), txn| {
                    if txn.is_income() {
                        (income + txn.amount, expense)
                    } else {
                        (income, expense + txn.amount)
                    }
                });
        Totals {
            income_total,
            expense_total,
            balance: income_total - expense_total,
        }
    }

    pub fn group_expenses_by_category(transactions: &[Transaction]) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        for txn in transactions.iter().filter(|txn| txn.is_expense()) {
            totals.add(&txn.category, txn.amount);
        }
        totals
    }

    /// Expense totals for the `month_count` calendar months ending with the month
    /// of `reference`, oldest first. Months without expenses report zero.
    pub fn monthly_expense_series(
        transactions: &[Transaction],
        month_count: usize,
        reference: NaiveDate,
    ) -> ServiceResult<Vec<MonthlyTotal>> {
        if month_count == 0 {
            return Err(ServiceError::InvalidInput(
                "month window must contain at least one month".into(),
            ));
        }
        let out_of_range = || {
            ServiceError::InvalidInput(format!(
                "month window of {month_count} reaches outside the supported calendar"
            ))
        };
        let newest = month_index(reference);
        let oldest = i64::try_from(month_count - 1)
            .ok()
            .and_then(|back| newest.checked_sub(back))
            .filter(|oldest| month_start(*oldest).is_some())
            .ok_or_else(out_of_range)?;

        // Both ends are valid calendar months.
        let mut series = Vec::with_capacity(month_count);
        for index in oldest..=newest {
            let anchor = month_start(index).ok_or_else(out_of_range)?;
            series.push(MonthlyTotal {
                year: anchor.year(),
                month: anchor.month(),
                label: anchor.format("%b").to_string(),
                total: 0.0,
            });
        }

        for txn in transactions.iter().filter(|txn| txn.is_expense()) {
            let index = month_index(txn.date());
            if (oldest..=newest).contains(&index) {
                series[(index - oldest) as usize].total += txn.amount;
            }
        }

        debug!(
            transactions = transactions.len(),
            months = month_count,
            "computed monthly expense series"
        );
        Ok(series)
    }

    pub fn current_month_expense_total(transactions: &[Transaction], reference: NaiveDate) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.is_expense() && txn.in_month_of(reference))
            .map(|txn| txn.amount)
            .sum()
    }

    /// Splits `transactions` into records safe to aggregate and the ones that are not.
    pub fn sanitize(transactions: &[Transaction]) -> (Vec<Transaction>, Vec<SkippedRecord>) {
        let mut valid = Vec::with_capacity(transactions.len());
        let mut skipped = Vec::new();
        for txn in transactions {
            match aggregation_check(txn) {
                Ok(()) => valid.push(txn.clone()),
                Err(reason) => {
                    warn!(id = %txn.id, %reason, "skipping malformed transaction");
                    skipped.push(SkippedRecord {
                        id: txn.id.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
        }
        (valid, skipped)
    }

    /// Computes every statistics view from the well-formed records in `transactions`.
    pub fn stats_report(
        transactions: &[Transaction],
        reference: NaiveDate,
        month_count: usize,
    ) -> ServiceResult<StatsReport> {
        let (valid, skipped) = Self::sanitize(transactions);
        Ok(StatsReport {
            totals: Self::compute_totals(&valid),
            by_category: Self::group_expenses_by_category(&valid),
            monthly: Self::monthly_expense_series(&valid, month_count, reference)?,
            current_month_expense: Self::current_month_expense_total(&valid, reference),
            skipped,
        })
    }
}

// Only the amount matters to the sums; label and owner problems are write-boundary concerns.
fn aggregation_check(txn: &Transaction) -> Result<(), InvalidTransaction> {
    if !txn.amount.is_finite() {
        return Err(InvalidTransaction::NonFiniteAmount(txn.amount));
    }
    if txn.amount <= 0.0 {
        return Err(InvalidTransaction::NonPositiveAmount(txn.amount));
    }
    Ok(())
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn month_start(index: i64) -> Option<NaiveDate> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransactionDraft, TransactionKind};
    use chrono::{TimeZone, Utc};

    fn txn(id: &str, kind: TransactionKind, category: &str, amount: f64) -> Transaction {
        dated(id, kind, category, amount, 2024, 6, 1)
    }

    fn dated(
        id: &str,
        kind: TransactionKind,
        category: &str,
        amount: f64,
        year: i32,
        month: u32,
        day: u32,
    ) -> Transaction {
        let at = Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap();
        TransactionDraft::new("owner", kind, category, amount, at).into_transaction(id)
    }

    fn scenario_a() -> Vec<Transaction> {
        vec![
            txn("t1", TransactionKind::Income, "Other", 1500.0),
            txn("t2", TransactionKind::Expense, "Rent", 650.0),
            txn("t3", TransactionKind::Expense, "Food", 120.0),
        ]
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn totals_for_salary_rent_and_food() {
        let totals = SummaryService::compute_totals(&scenario_a());
        assert_eq!(
            totals,
            Totals {
                income_total: 1500.0,
                expense_total: 770.0,
                balance: 730.0,
            }
        );
    }

    #[test]
    fn totals_for_empty_input_are_zero() {
        assert_eq!(SummaryService::compute_totals(&[]), Totals::default());
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let mut ts = scenario_a();
        ts.push(txn("t4", TransactionKind::Expense, "Transport", 55.5));
        ts.push(txn("t5", TransactionKind::Income, "Other", 0.25));
        let totals = SummaryService::compute_totals(&ts);
        assert_eq!(totals.balance, totals.income_total - totals.expense_total);
    }

    #[test]
    fn grouping_keeps_first_occurrence_order() {
        let grouped = SummaryService::group_expenses_by_category(&scenario_a());
        let labels: Vec<&str> = grouped.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(labels, vec!["Rent", "Food"]);
        assert_eq!(grouped.get("Rent"), Some(650.0));
        assert_eq!(grouped.get("Food"), Some(120.0));
        assert_eq!(grouped.get("Other"), None);
    }

    #[test]
    fn grouping_accumulates_repeated_categories() {
        let ts = vec![
            txn("a", TransactionKind::Expense, "Food", 10.0),
            txn("b", TransactionKind::Expense, "Rent", 100.0),
            txn("c", TransactionKind::Expense, "Food", 5.0),
        ];
        let grouped = SummaryService::group_expenses_by_category(&ts);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get("Food"), Some(15.0));
        assert_eq!(grouped.grand_total(), 115.0);
    }

    #[test]
    fn grouping_without_expenses_is_empty() {
        assert!(SummaryService::group_expenses_by_category(&[]).is_empty());
        let income_only = vec![txn("i", TransactionKind::Income, "Other", 10.0)];
        let grouped = SummaryService::group_expenses_by_category(&income_only);
        assert!(grouped.is_empty());
        assert!(grouped.shares().is_empty());
    }

    #[test]
    fn shares_sum_to_one() {
        let grouped = SummaryService::group_expenses_by_category(&scenario_a());
        let sum: f64 = grouped.shares().iter().map(|(_, share)| share).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn permuting_input_keeps_totals() {
        let ts = scenario_a();
        let mut reversed = ts.clone();
        reversed.reverse();
        assert_eq!(
            SummaryService::compute_totals(&ts),
            SummaryService::compute_totals(&reversed)
        );
        let forward = SummaryService::group_expenses_by_category(&ts);
        let backward = SummaryService::group_expenses_by_category(&reversed);
        for entry in &forward {
            assert_eq!(backward.get(&entry.category), Some(entry.total));
        }
        assert_eq!(forward.len(), backward.len());
    }

    #[test]
    fn monthly_series_is_dense_and_oldest_first() {
        let ts = vec![
            dated("jun", TransactionKind::Expense, "Food", 92.45, 2024, 6, 1),
            dated("may", TransactionKind::Expense, "Fun", 45.0, 2024, 5, 1),
            dated("inc", TransactionKind::Income, "Other", 900.0, 2024, 5, 2),
        ];
        let series = SummaryService::monthly_expense_series(&ts, 6, ymd(2024, 6, 15)).unwrap();
        let labels: Vec<&str> = series.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        let totals: Vec<f64> = series.iter().map(|m| m.total).collect();
        assert_eq!(totals, vec![0.0, 0.0, 0.0, 0.0, 45.0, 92.45]);
        assert!(series.iter().all(|m| m.year == 2024));
    }

    #[test]
    fn monthly_series_crosses_year_boundary() {
        let ts = vec![dated("dec", TransactionKind::Expense, "Bills", 30.0, 2023, 12, 31)];
        let series = SummaryService::monthly_expense_series(&ts, 3, ymd(2024, 2, 10)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!((series[0].year, series[0].month), (2023, 12));
        assert_eq!(series[0].total, 30.0);
        assert_eq!((series[2].year, series[2].month), (2024, 2));
    }

    #[test]
    fn monthly_series_ignores_same_month_of_other_years() {
        let ts = vec![dated("old", TransactionKind::Expense, "Food", 12.0, 2023, 6, 3)];
        let series = SummaryService::monthly_expense_series(&ts, 6, ymd(2024, 6, 15)).unwrap();
        assert!(series.iter().all(|m| m.total == 0.0));
    }

    #[test]
    fn monthly_series_has_requested_length() {
        for n in [1, 6, 13, 36] {
            let series = SummaryService::monthly_expense_series(&[], n, ymd(2024, 6, 15)).unwrap();
            assert_eq!(series.len(), n);
        }
    }

    #[test]
    fn monthly_series_rejects_empty_window() {
        let err = SummaryService::monthly_expense_series(&[], 0, ymd(2024, 6, 15))
            .expect_err("zero months must be rejected");
        assert!(matches!(err, ServiceError::InvalidInput(_)), "{err:?}");
    }

    #[test]
    fn monthly_series_rejects_window_beyond_calendar() {
        let reference = ymd(2024, 6, 15);
        for months in [usize::MAX, i64::MAX as usize, 100_000_000] {
            assert!(matches!(
                SummaryService::monthly_expense_series(&[], months, reference),
                Err(ServiceError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn current_month_total_only_counts_matching_expenses() {
        let ts = vec![
            dated("a", TransactionKind::Expense, "Food", 20.0, 2024, 6, 1),
            dated("b", TransactionKind::Expense, "Food", 5.5, 2024, 6, 30),
            dated("c", TransactionKind::Income, "Other", 100.0, 2024, 6, 2),
            dated("d", TransactionKind::Expense, "Food", 7.0, 2024, 5, 31),
        ];
        let total = SummaryService::current_month_expense_total(&ts, ymd(2024, 6, 15));
        assert_eq!(total, 25.5);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let ts = scenario_a();
        let reference = ymd(2024, 6, 15);
        let first = SummaryService::stats_report(&ts, reference, 6).unwrap();
        let second = SummaryService::stats_report(&ts, reference, 6).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stats_report_skips_and_reports_malformed_records() {
        let mut ts = scenario_a();
        ts.push(txn("neg", TransactionKind::Expense, "Food", -10.0));
        ts.push(txn("nan", TransactionKind::Income, "Other", f64::NAN));
        let report = SummaryService::stats_report(&ts, ymd(2024, 6, 15), 6).unwrap();
        assert_eq!(report.totals.balance, 730.0);
        assert_eq!(report.by_category.get("Food"), Some(120.0));
        assert_eq!(report.current_month_expense, 770.0);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["neg", "nan"]);
    }
}
