//! Currency formatting for presentation. Aggregation never rounds; this module does.

use serde::{Deserialize, Serialize};

use crate::{config::Config, core::services::Totals};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Symbol placement and separators for one currency/locale pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyFormat {
    pub code: CurrencyCode,
    pub symbol: String,
    pub symbol_spacing: bool,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl CurrencyFormat {
    /// `en-US` dollars: `$1,234.50`.
    pub fn usd() -> Self {
        Self {
            code: CurrencyCode::new("USD"),
            symbol: "$".into(),
            symbol_spacing: false,
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }

    /// `en-ZA` rand: `R 1 234,50`.
    pub fn zar() -> Self {
        Self {
            code: CurrencyCode::new("ZAR"),
            symbol: "R".into(),
            symbol_spacing: true,
            decimal_separator: ',',
            grouping_separator: ' ',
        }
    }

    /// Known format for `code`, or a code-prefixed fallback.
    pub fn for_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "USD" => Self::usd(),
            "ZAR" => Self::zar(),
            other => Self {
                code: CurrencyCode::new(other),
                symbol: other.to_string(),
                symbol_spacing: true,
                decimal_separator: '.',
                grouping_separator: ',',
            },
        }
    }

    /// Applies the separators of `locale` while keeping the currency symbol.
    /// Unknown locales leave the format unchanged.
    pub fn with_locale(mut self, locale: &str) -> Self {
        match locale.trim() {
            "en-ZA" => {
                self.decimal_separator = ',';
                self.grouping_separator = ' ';
                self.symbol_spacing = true;
            }
            "en-US" => {
                self.decimal_separator = '.';
                self.grouping_separator = ',';
            }
            _ => {}
        }
        self
    }

    /// Format for the configured currency and locale.
    pub fn for_config(config: &Config) -> Self {
        Self::for_code(&config.currency).with_locale(&config.locale)
    }

    /// Formats `value` with two decimals. Non-finite values format as zero.
    pub fn format(&self, value: f64) -> String {
        let value = if value.is_finite() { value } else { 0.0 };
        let fixed = format!("{:.2}", value.abs());
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.symbol);
        if self.symbol_spacing {
            out.push(' ');
        }
        out.push_str(&group_digits(whole, self.grouping_separator));
        out.push(self.decimal_separator);
        out.push_str(fraction);
        out
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::usd()
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// `Balance: + $730.00`, with a minus sign (U+2212) for negative balances.
pub fn balance_label(balance: f64, format: &CurrencyFormat) -> String {
    let sign = if balance >= 0.0 { '+' } else { '\u{2212}' };
    format!("Balance: {} {}", sign, format.format(balance.abs()))
}

/// `Income: $1,500.00 • Expenses: $770.00`.
pub fn totals_hint(totals: &Totals, format: &CurrencyFormat) -> String {
    format!(
        "Income: {} \u{2022} Expenses: {}",
        format.format(totals.income_total),
        format.format(totals.expense_total)
    )
}
