//! Preference list validation.
//!
//! Rules run in a fixed precedence order and the first failure wins:
//! length, existence, uniqueness, then category quotas over the first
//! `required_count` entries. A failing list is cleared as a whole.

use std::collections::HashSet;

use affectation_core::{
    Category, CleanedTable, InvalidReason, Invalidation, PostingCatalog, PreferenceList,
    PreferenceTable, ValidationRules,
};
use serde::Serialize;
use tracing::{info, warn};

/// Validates preference tables against a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceValidator {
    rules: ValidationRules,
}

/// Result of validating a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub table: CleanedTable,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Valid auditors that declared more than `required_count` entries.
    pub overflow_count: usize,
}

impl ValidationOutcome {
    /// Invalid lists, in input order.
    pub fn invalid(&self) -> impl Iterator<Item = &PreferenceList> {
        self.table.iter().filter(|l| !l.is_valid())
    }

    /// Number of invalid lists carrying `reason`.
    pub fn count_by_reason(&self, reason: InvalidReason) -> usize {
        self.invalid()
            .filter(|l| l.invalidation.as_ref().map(Invalidation::reason) == Some(reason))
            .count()
    }
}

impl PreferenceValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> ValidationRules {
        self.rules
    }

    /// Checks one declared list and returns the first failing rule.
    pub fn check(&self, declared: &[String], catalog: &PostingCatalog) -> Result<(), Invalidation> {
        let required = self.rules.required_count;

        if declared.len() < required {
            return Err(Invalidation::Insufficient {
                declared: declared.len(),
                required,
            });
        }

        if let Some(unknown) = declared.iter().find(|name| !catalog.contains(name)) {
            return Err(Invalidation::Unknown {
                posting: unknown.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(declared.len());
        if let Some(repeated) = declared.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(Invalidation::Duplicate {
                posting: repeated.clone(),
            });
        }

        if let Some(quotas) = self.rules.quotas {
            let window = &declared[..required.min(declared.len())];
            let count = |category: Category| {
                window
                    .iter()
                    .filter(|name| catalog.is_member(name, category))
                    .count()
            };
            let restricted = count(Category::Restricted);
            let discouraged = count(Category::Discouraged);
            let preferred = count(Category::Preferred);

            if !quotas.admits(restricted, discouraged, preferred) {
                return Err(Invalidation::Quota {
                    restricted,
                    discouraged,
                    preferred,
                });
            }
        }

        Ok(())
    }

    /// Validates every row of `table`.
    ///
    /// Each invalid auditor is logged with its reason and the offending data.
    ///
    /// # Examples
    ///
    /// ```
    /// use affectation_core::{PostingCatalog, PostingRecord, PreferenceRow, PreferenceTable, ValidationRules};
    /// use affectation_solver::PreferenceValidator;
    ///
    /// let catalog = PostingCatalog::build(&[
    ///     PostingRecord::new("Lyon", 1, ""),
    ///     PostingRecord::new("Metz", 1, ""),
    /// ])
    /// .unwrap();
    /// let table = PreferenceTable::new(vec![
    ///     PreferenceRow::from_names("a1", ["Lyon", "Metz"]),
    ///     PreferenceRow::from_names("a2", ["Lyon", "Brest"]),
    /// ]);
    ///
    /// let outcome = PreferenceValidator::new(ValidationRules::free_choice(2)).validate(&table, &catalog);
    /// assert_eq!(outcome.valid_count, 1);
    /// assert_eq!(outcome.invalid_count, 1);
    /// ```
    pub fn validate(&self, table: &PreferenceTable, catalog: &PostingCatalog) -> ValidationOutcome {
        let mut lists = Vec::with_capacity(table.len());
        let mut valid_count = 0;
        let mut overflow_count = 0;

        for row in &table.rows {
            let declared = row.declared();
            match self.check(&declared, catalog) {
                Ok(()) => {
                    valid_count += 1;
                    if declared.len() > self.rules.required_count {
                        overflow_count += 1;
                    }
                    lists.push(PreferenceList::valid(row.auditor.clone(), declared));
                }
                Err(invalidation) => {
                    warn!(
                        event = "auditor_invalid",
                        auditor = %row.auditor,
                        reason = %invalidation.reason(),
                        detail = %invalidation,
                    );
                    lists.push(PreferenceList::invalid(
                        row.auditor.clone(),
                        declared,
                        invalidation,
                    ));
                }
            }
        }

        let invalid_count = lists.len() - valid_count;
        info!(
            event = "validation_end",
            auditors = lists.len(),
            valid = valid_count,
            invalid = invalid_count,
            overflow = overflow_count,
            required_count = self.rules.required_count,
            quotas = self.rules.quotas.is_some(),
        );

        ValidationOutcome {
            table: CleanedTable { lists },
            valid_count,
            invalid_count,
            overflow_count,
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
