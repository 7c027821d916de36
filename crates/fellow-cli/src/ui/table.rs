//! Table rendering for CLI output using comfy-table.
//!
//! Provides consistent table formatting for commands that display tabular
//! data.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use super::format::format_thousands;

/// One row of the store summary table.
#[derive(Debug, Clone)]
pub struct CountRow {
    /// Category label (e.g., "entities").
    pub label: String,
    /// Count for the category, if the backing document was readable.
    pub count: Option<u64>,
}

impl CountRow {
    /// Build a row from an optional count.
    pub fn new(label: &str, count: Option<usize>) -> Self {
        Self {
            label: label.to_string(),
            count: count.map(|c| c as u64),
        }
    }
}

/// Render the store summary table for `fellow status`.
///
/// # Example Output
///
/// ```text
/// CATEGORY        COUNT
/// entities           42
/// relationships      17
/// workflows           5
/// ```
pub fn render_counts_table(rows: &[CountRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);

    table.set_header(vec![
        Cell::new("CATEGORY"),
        Cell::new("COUNT").set_alignment(CellAlignment::Right),
    ]);

    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(14)),
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),
    ]);

    for row in rows {
        let count = row
            .count
            .map(format_thousands)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&row.label),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}
