//! Posting table fixtures.
//!
//! # Example
//!
//! ```
//! use affectation_test::postings::catalog;
//!
//! let catalog = catalog(&[("Lyon", 2, "vert"), ("Metz", 1, "noir")]);
//! assert_eq!(catalog.total_capacity(), 3);
//! ```

use affectation_core::{PostingCatalog, PostingRecord};

/// Builds posting records from `(name, capacity, tag)` triples.
pub fn records(rows: &[(&str, i64, &str)]) -> Vec<PostingRecord> {
    rows.iter()
        .map(|&(name, capacity, tag)| PostingRecord::new(name, capacity, tag))
        .collect()
}

/// Builds a catalog from `(name, capacity, tag)` triples.
///
/// # Panics
///
/// Panics if the table is rejected by [`PostingCatalog::build`].
pub fn catalog(rows: &[(&str, i64, &str)]) -> PostingCatalog {
    PostingCatalog::build(&records(rows)).expect("fixture catalog must be valid")
}

/// Creates `n` unrestricted postings `P0..Pn` of equal capacity.
pub fn uniform_postings(n: usize, capacity: i64) -> Vec<PostingRecord> {
    (0..n)
        .map(|i| PostingRecord::new(format!("P{i}"), capacity, "unrestricted"))
        .collect()
}
