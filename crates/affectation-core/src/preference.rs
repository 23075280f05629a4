//! Auditor preference tables.
//!
//! A [`PreferenceTable`] is the raw input: one row per auditor with possibly
//! empty cells. Overrides turn it into another table. Validation turns it into
//! a [`CleanedTable`], where each [`PreferenceList`] is either kept whole or
//! cleared with an [`Invalidation`] explaining why.

use std::collections::{HashMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, Result};

/// Unique identifier of an auditor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AuditorId(pub String);

impl AuditorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AuditorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AuditorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One auditor's raw preference cells, rank order left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreferenceRow {
    pub auditor: AuditorId,
    pub cells: Vec<Option<String>>,
}

impl PreferenceRow {
    pub fn new(auditor: impl Into<AuditorId>, cells: Vec<Option<String>>) -> Self {
        Self {
            auditor: auditor.into(),
            cells,
        }
    }

    /// Builds a gap-free row.
    pub fn from_names<I, S>(auditor: impl Into<AuditorId>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(auditor, names.into_iter().map(|n| Some(n.into())).collect())
    }

    /// Declared posting names in rank order.
    ///
    /// Cells are trimmed, anything after a `//` annotation is dropped and
    /// empty cells are gaps.
    ///
    /// ```
    /// use affectation_core::PreferenceRow;
    ///
    /// let row = PreferenceRow::new(
    ///     "17",
    ///     vec![Some(" Lyon ".into()), None, Some("Metz // near family".into()), Some("".into())],
    /// );
    /// assert_eq!(row.declared(), ["Lyon", "Metz"]);
    /// ```
    pub fn declared(&self) -> Vec<String> {
        self.cells
            .iter()
            .flatten()
            .map(|cell| normalize_cell(cell))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn normalize_cell(cell: &str) -> String {
    cell.split("//").next().unwrap_or_default().trim().to_string()
}

/// Raw preference table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreferenceTable {
    pub rows: Vec<PreferenceRow>,
}

impl PreferenceTable {
    pub fn new(rows: Vec<PreferenceRow>) -> Self {
        Self { rows }
    }

    /// Number of preference columns, counting gaps.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fails on the first auditor id that appears on two rows.
    pub fn ensure_unique_auditors(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if !seen.insert(&row.auditor) {
                return Err(ConfigError::DuplicateAuditor {
                    auditor: row.auditor.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Caps an auditor's list to its first `keep` declared entries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreferenceOverride {
    pub auditor: AuditorId,
    pub keep: usize,
}

impl PreferenceOverride {
    pub fn new(auditor: impl Into<AuditorId>, keep: usize) -> Self {
        Self {
            auditor: auditor.into(),
            keep,
        }
    }
}

/// Applies per-auditor truncations, returning a new table.
///
/// Must run before validation so truncated lists are validated in their
/// final form. Overrides naming an auditor absent from the table are
/// logged and ignored. When an auditor has several overrides, the last
/// one wins.
pub fn apply_overrides(table: &PreferenceTable, overrides: &[PreferenceOverride]) -> PreferenceTable {
    let mut caps: HashMap<&AuditorId, usize> = HashMap::with_capacity(overrides.len());
    for o in overrides {
        caps.insert(&o.auditor, o.keep);
    }

    for o in overrides {
        if !table.rows.iter().any(|r| r.auditor == o.auditor) {
            warn!(event = "override_ignored", auditor = %o.auditor, keep = o.keep);
        }
    }

    let rows = table
        .rows
        .iter()
        .map(|row| match caps.get(&row.auditor) {
            Some(&keep) => {
                let declared = row.declared();
                info!(
                    event = "override_applied",
                    auditor = %row.auditor,
                    keep = keep,
                    declared = declared.len(),
                );
                PreferenceRow::from_names(row.auditor.clone(), declared.into_iter().take(keep))
            }
            None => row.clone(),
        })
        .collect();

    PreferenceTable { rows }
}

/// Reason code of an invalid preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InvalidReason {
    Insufficient,
    Unknown,
    Duplicate,
    Quota,
}

impl InvalidReason {
    pub const fn label(self) -> &'static str {
        match self {
            InvalidReason::Insufficient => "insufficient",
            InvalidReason::Unknown => "unknown",
            InvalidReason::Duplicate => "duplicate",
            InvalidReason::Quota => "quota",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First failing rule of a preference list, with the offending data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "reason", rename_all = "snake_case"))]
pub enum Invalidation {
    Insufficient { declared: usize, required: usize },
    Unknown { posting: String },
    Duplicate { posting: String },
    Quota { restricted: usize, discouraged: usize, preferred: usize },
}

impl Invalidation {
    pub fn reason(&self) -> InvalidReason {
        match self {
            Invalidation::Insufficient { .. } => InvalidReason::Insufficient,
            Invalidation::Unknown { .. } => InvalidReason::Unknown,
            Invalidation::Duplicate { .. } => InvalidReason::Duplicate,
            Invalidation::Quota { .. } => InvalidReason::Quota,
        }
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalidation::Insufficient { declared, required } => {
                write!(f, "not enough preferences ({declared} of {required})")
            }
            Invalidation::Unknown { posting } => write!(f, "unknown posting '{posting}'"),
            Invalidation::Duplicate { posting } => write!(f, "posting '{posting}' listed twice"),
            Invalidation::Quota {
                restricted,
                discouraged,
                preferred,
            } => write!(
                f,
                "category quotas violated ({restricted} restricted, {discouraged} discouraged, {preferred} preferred)"
            ),
        }
    }
}

/// An auditor's list after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreferenceList {
    pub auditor: AuditorId,
    /// Entries as declared (after overrides), kept for audit logs.
    pub declared: Vec<String>,
    /// Entries used for assignment; empty when invalid.
    pub choices: Vec<String>,
    pub invalidation: Option<Invalidation>,
}

impl PreferenceList {
    pub fn valid(auditor: AuditorId, declared: Vec<String>) -> Self {
        Self {
            auditor,
            choices: declared.clone(),
            declared,
            invalidation: None,
        }
    }

    pub fn invalid(auditor: AuditorId, declared: Vec<String>, invalidation: Invalidation) -> Self {
        Self {
            auditor,
            declared,
            choices: Vec::new(),
            invalidation: Some(invalidation),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.invalidation.is_none()
    }

    /// 1-based rank of `posting` among the choices.
    pub fn rank_of(&self, posting: &str) -> Option<usize> {
        self.choices.iter().position(|c| c == posting).map(|i| i + 1)
    }
}

/// Validated preference lists, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CleanedTable {
    pub lists: Vec<PreferenceList>,
}

impl CleanedTable {
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreferenceList> {
        self.lists.iter()
    }

    pub fn valid(&self) -> impl Iterator<Item = &PreferenceList> {
        self.lists.iter().filter(|l| l.is_valid())
    }

    pub fn get(&self, auditor: &AuditorId) -> Option<&PreferenceList> {
        self.lists.iter().find(|l| &l.auditor == auditor)
    }

    /// Raw table holding the cleaned choices, for re-validation.
    pub fn to_table(&self) -> PreferenceTable {
        PreferenceTable {
            rows: self
                .lists
                .iter()
                .map(|l| PreferenceRow::from_names(l.auditor.clone(), l.choices.iter().cloned()))
                .collect(),
        }
    }
}
