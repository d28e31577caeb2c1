use colored::Colorize;
use std::fmt;

use crate::{
    core::services::{CategoryTotals, MonthlyTotal, StatsReport},
    currency::{balance_label, totals_hint, CurrencyFormat},
    domain::{Transaction, TransactionKind},
};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Section,
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Info => text,
        MessageKind::Success => text.green().to_string(),
        MessageKind::Warning => text.yellow().to_string(),
        MessageKind::Section => text.bold().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    println!("{}", apply_style(kind, message));
}

pub fn section(title: &str) {
    print(MessageKind::Section, title);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

/// One list row: `+ $1,500.00  Income  Monthly salary  2024-05-26  [id]`.
pub fn transaction_line(txn: &Transaction, format: &CurrencyFormat) -> String {
    let amount = format.format(txn.amount);
    let signed = match txn.kind {
        TransactionKind::Income => format!("+ {amount}").green().to_string(),
        TransactionKind::Expense => format!("\u{2212} {amount}").red().to_string(),
    };
    format!(
        "{signed}  {}  {}  {}  [{}]",
        txn.category,
        txn.note.as_deref().unwrap_or("\u{2014}"),
        txn.date(),
        txn.id
    )
}

pub fn category_lines(totals: &CategoryTotals, format: &CurrencyFormat) -> Vec<String> {
    if totals.is_empty() {
        return vec!["No expenses to chart yet.".to_string()];
    }
    totals
        .shares()
        .into_iter()
        .zip(totals.iter())
        .map(|((category, share), entry)| {
            format!(
                "{category}: {} ({:.1}%)",
                format.format(entry.total),
                share * 100.0
            )
        })
        .collect()
}

pub fn trend_lines(series: &[MonthlyTotal], format: &CurrencyFormat) -> Vec<String> {
    series
        .iter()
        .map(|point| format!("{} {}: {}", point.label, point.year, format.format(point.total)))
        .collect()
}

pub fn print_report(report: &StatsReport, format: &CurrencyFormat) {
    section("Summary");
    info(balance_label(report.totals.balance, format));
    info(totals_hint(&report.totals, format));
    info(format!(
        "This month: {}",
        format.format(report.current_month_expense)
    ));
    for skipped in &report.skipped {
        warning(format!("Skipped {}: {}", skipped.id, skipped.reason));
    }
}
