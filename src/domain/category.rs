//! Display metadata for grouping transactions.

use serde::{Deserialize, Serialize};

/// Color used when a label has no matching category entry.
pub const FALLBACK_COLOR: &str = "#007AFF";

/// Labels offered by the single-page demo.
pub const DEMO_LABELS: [&str; 6] = [
    "Food",
    "Transport",
    "Rent",
    "Entertainment",
    "Utilities",
    "Other",
];

/// Slice colors used by the demo pie chart, cycled by slice index.
pub const DEMO_PALETTE: [&str; 6] = [
    "#ff6b6b", "#feca57", "#667eea", "#22c55e", "#a855f7", "#38bdf8",
];

/// Categorises transactions for reporting. Carries no behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }

    /// The seven categories offered by the mobile app.
    pub fn app_defaults() -> Vec<Category> {
        vec![
            Category::new("1", "Food", "#FF6B6B", "restaurant"),
            Category::new("2", "Transport", "#4ECDC4", "directions-car"),
            Category::new("3", "Entertainment", "#45B7D1", "movie"),
            Category::new("4", "Shopping", "#96CEB4", "shopping-cart"),
            Category::new("5", "Bills", "#FECA57", "receipt"),
            Category::new("6", "Healthcare", "#FF9FF3", "local-hospital"),
            Category::new("7", "Income", "#54A0FF", "attach-money"),
        ]
    }

    /// Resolves the display color for `name`, falling back to [`FALLBACK_COLOR`].
    pub fn color_for<'a>(categories: &'a [Category], name: &str) -> &'a str {
        categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }
}

/// Color for the `index`-th slice of the demo chart.
pub fn demo_slice_color(index: usize) -> &'static str {
    DEMO_PALETTE[index % DEMO_PALETTE.len()]
}
