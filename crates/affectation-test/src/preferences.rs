//! Preference table fixtures.
//!
//! # Example
//!
//! ```
//! use affectation_test::preferences::table;
//!
//! let table = table(&[("a1", &["Lyon", "Metz"]), ("a2", &["Metz"])]);
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.width(), 2);
//! ```

use affectation_core::{PreferenceRow, PreferenceTable};

/// Builds a row with one cell per name, no gaps.
pub fn row(auditor: &str, names: &[&str]) -> PreferenceRow {
    PreferenceRow::from_names(auditor, names.iter().copied())
}

/// Builds a table from `(auditor, names)` pairs.
pub fn table(rows: &[(&str, &[&str])]) -> PreferenceTable {
    PreferenceTable::new(rows.iter().map(|&(auditor, names)| row(auditor, names)).collect())
}
