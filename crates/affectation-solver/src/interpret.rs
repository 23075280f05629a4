//! Translation of a matching into placements and satisfaction statistics.

use std::collections::BTreeMap;
use std::fmt;

use affectation_core::{AuditorId, PostingCatalog, PreferenceList};
use serde::Serialize;

use crate::assignment::Matching;

/// Outcome rank of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfiedRank {
    /// 1-based position of the posting in the auditor's list.
    Preference(u32),
    /// The posting is absent from the auditor's list.
    OutsidePreferences,
}

impl SatisfiedRank {
    /// Numeric stand-in for [`SatisfiedRank::OutsidePreferences`] in flat exports.
    pub const SENTINEL: u32 = 100;

    pub fn preference(self) -> Option<u32> {
        match self {
            SatisfiedRank::Preference(rank) => Some(rank),
            SatisfiedRank::OutsidePreferences => None,
        }
    }

    pub fn as_number(self) -> u32 {
        self.preference().unwrap_or(Self::SENTINEL)
    }

    pub fn is_within(self, k: u32) -> bool {
        matches!(self, SatisfiedRank::Preference(rank) if rank <= k)
    }
}

impl fmt::Display for SatisfiedRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatisfiedRank::Preference(rank) => write!(f, "{rank}"),
            SatisfiedRank::OutsidePreferences => f.write_str("HV"),
        }
    }
}

/// One auditor's assigned posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub auditor: AuditorId,
    pub posting: String,
    pub rank: SatisfiedRank,
    /// False when the auditor's list was invalidated.
    pub list_valid: bool,
}

/// Remaining capacity of a posting after assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vacancy {
    pub posting: String,
    pub capacity: u32,
    pub filled: u32,
}

impl Vacancy {
    pub fn remaining(&self) -> u32 {
        self.capacity - self.filled
    }
}

/// Aggregate satisfaction of one solved run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionSummary {
    pub placed: usize,
    pub unplaced: usize,
    /// Mean rank over placements inside preferences; `None` if there are none.
    pub mean_rank: Option<f64>,
    pub outside_count: usize,
    /// Percentage of placed auditors within their first 3 choices.
    pub within_top_3_pct: f64,
    /// Percentage of placed auditors within their first 4 choices.
    pub within_top_4_pct: f64,
    /// Placements per satisfied rank, outside preferences excluded.
    pub rank_histogram: BTreeMap<u32, usize>,
    pub total_cost: f64,
}

/// Placements, unplaced auditors, summary and vacancies of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentReport {
    pub placements: Vec<Placement>,
    /// Auditors left without a column when they outnumber capacity.
    pub unplaced: Vec<AuditorId>,
    pub summary: SatisfactionSummary,
    /// Per posting, in catalog order.
    pub vacancies: Vec<Vacancy>,
}

impl AssignmentReport {
    pub fn placement_of(&self, auditor: &AuditorId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.auditor == auditor)
    }

    /// Placements grouped by posting, in catalog order, postings without
    /// placements included.
    pub fn by_posting(&self) -> Vec<(&str, Vec<&Placement>)> {
        let mut groups: Vec<(&str, Vec<&Placement>)> = self
            .vacancies
            .iter()
            .map(|v| (v.posting.as_str(), Vec::new()))
            .collect();
        for placement in &self.placements {
            if let Some((_, group)) = groups
                .iter_mut()
                .find(|(name, _)| *name == placement.posting)
            {
                group.push(placement);
            }
        }
        groups
    }

    /// Percentage of placed auditors within their first `k` choices.
    pub fn share_within(&self, k: u32) -> f64 {
        share_within(&self.placements, k)
    }

    /// Postings still holding free capacity.
    pub fn open_postings(&self) -> impl Iterator<Item = &Vacancy> {
        self.vacancies.iter().filter(|v| v.remaining() > 0)
    }
}

fn share_within(placements: &[Placement], k: u32) -> f64 {
    if placements.is_empty() {
        return 0.0;
    }
    let hits = placements.iter().filter(|p| p.rank.is_within(k)).count();
    100.0 * hits as f64 / placements.len() as f64
}

/// Maps matrix columns back to postings and ranks.
#[derive(Debug, Clone, Copy)]
pub struct ResultInterpreter<'a> {
    catalog: &'a PostingCatalog,
}

impl<'a> ResultInterpreter<'a> {
    pub fn new(catalog: &'a PostingCatalog) -> Self {
        Self { catalog }
    }

    /// Builds the report of `matching`, whose row `i` is `rows[i]`.
    ///
    /// Placements keep row order.
    pub fn interpret(&self, matching: &Matching, rows: &[&PreferenceList]) -> AssignmentReport {
        let mut placements = Vec::with_capacity(matching.len());
        let mut unplaced = Vec::new();
        let mut filled = vec![0u32; self.catalog.len()];

        for (row, list) in rows.iter().enumerate() {
            let posting = matching
                .row_to_col
                .get(row)
                .copied()
                .flatten()
                .and_then(|col| self.catalog.column_owner(col));

            let Some(posting) = posting else {
                unplaced.push(list.auditor.clone());
                continue;
            };

            if let Some(k) = self.catalog.index_of(&posting.name) {
                filled[k] += 1;
            }
            let rank = match list.rank_of(&posting.name) {
                Some(r) => SatisfiedRank::Preference(r as u32),
                None => SatisfiedRank::OutsidePreferences,
            };
            placements.push(Placement {
                auditor: list.auditor.clone(),
                posting: posting.name.clone(),
                rank,
                list_valid: list.is_valid(),
            });
        }

        let vacancies = self
            .catalog
            .postings()
            .iter()
            .zip(filled)
            .map(|(p, filled)| Vacancy {
                posting: p.name.clone(),
                capacity: p.capacity,
                filled,
            })
            .collect();

        let summary = summarize(&placements, unplaced.len(), matching.total_cost);

        AssignmentReport {
            placements,
            unplaced,
            summary,
            vacancies,
        }
    }
}

fn summarize(placements: &[Placement], unplaced: usize, total_cost: f64) -> SatisfactionSummary {
    let mut rank_histogram = BTreeMap::new();
    let mut rank_sum = 0u64;
    let mut outside_count = 0;

    for placement in placements {
        match placement.rank {
            SatisfiedRank::Preference(rank) => {
                *rank_histogram.entry(rank).or_insert(0) += 1;
                rank_sum += u64::from(rank);
            }
            SatisfiedRank::OutsidePreferences => outside_count += 1,
        }
    }

    let inside = placements.len() - outside_count;
    let mean_rank = (inside > 0).then(|| rank_sum as f64 / inside as f64);

    SatisfactionSummary {
        placed: placements.len(),
        unplaced,
        mean_rank,
        outside_count,
        within_top_3_pct: share_within(placements, 3),
        within_top_4_pct: share_within(placements, 4),
        rank_histogram,
        total_cost,
    }
}
