//! Demand statistics over validated preference lists.
//!
//! Counts are taken from valid lists only. The assignment-rate curve is an
//! upper bound derived from which postings are listed at all, never a
//! statement about a solved assignment.

use affectation_core::{Category, CleanedTable, PostingCatalog};
use serde::Serialize;
use tracing::info;

/// Demand received by one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingDemand {
    pub name: String,
    pub capacity: u32,
    pub category: Category,
    /// `by_rank[k]` counts auditors listing the posting at rank `k + 1`.
    pub by_rank: Vec<u32>,
    /// Listings beyond the required ranks.
    pub overflow: u32,
}

impl PostingDemand {
    pub fn total(&self) -> u32 {
        self.by_rank.iter().sum::<u32>() + self.overflow
    }

    /// Listings within the first `n` ranks.
    pub fn within(&self, n: usize) -> u32 {
        self.by_rank.iter().take(n).sum()
    }

    pub fn first_choice(&self) -> u32 {
        self.by_rank.first().copied().unwrap_or(0)
    }
}

/// One point of the assignment-rate curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub prefix_len: usize,
    /// Capacity of postings listed at least once within the first `prefix_len` ranks.
    pub claimed_capacity: u64,
    /// `claimed_capacity` as a percentage of total capacity.
    pub capacity_share_pct: f64,
    /// Upper bound on the percentage of auditors satisfiable within
    /// `prefix_len` choices.
    pub reachable_pct: f64,
}

/// Lower bounds on auditors the matching cannot satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeasibilityBound {
    /// Total capacity minus auditor count.
    pub margin: i64,
    /// Auditors that will be placed on a posting outside their list.
    pub guaranteed_outside: u64,
    /// Auditors left without a seat.
    pub guaranteed_unplaced: u64,
}

/// Output of [`DemandAnalyzer::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandReport {
    /// Per-posting demand, in catalog order.
    pub postings: Vec<PostingDemand>,
    pub zero_demand: Vec<String>,
    pub unclaimed_capacity: u64,
    pub rate_curve: Vec<RatePoint>,
    pub total_capacity: u64,
    pub auditor_count: usize,
}

impl DemandReport {
    pub fn get(&self, name: &str) -> Option<&PostingDemand> {
        self.postings.iter().find(|p| p.name == name)
    }

    /// The `n` postings with the highest total demand; ties keep catalog order.
    pub fn most_demanded(&self, n: usize) -> Vec<&PostingDemand> {
        let mut ranked: Vec<&PostingDemand> = self.postings.iter().collect();
        ranked.sort_by(|a, b| b.total().cmp(&a.total()));
        ranked.truncate(n);
        ranked
    }

    /// The `n` postings with the lowest total demand; ties keep catalog order.
    pub fn least_demanded(&self, n: usize) -> Vec<&PostingDemand> {
        let mut ranked: Vec<&PostingDemand> = self.postings.iter().collect();
        ranked.sort_by_key(|p| p.total());
        ranked.truncate(n);
        ranked
    }

    /// The `n` postings most often listed first, skipping postings nobody
    /// listed first.
    pub fn first_choice_leaders(&self, n: usize) -> Vec<&PostingDemand> {
        let mut ranked: Vec<&PostingDemand> = self
            .postings
            .iter()
            .filter(|p| p.first_choice() > 0)
            .collect();
        ranked.sort_by(|a, b| b.first_choice().cmp(&a.first_choice()));
        ranked.truncate(n);
        ranked
    }

    /// Lower bounds on outside placements and unplaced auditors.
    ///
    /// Every seat is filled while auditors remain, so `min(auditors,
    /// capacity)` are placed. Valid auditors can only be satisfied on
    /// claimed seats, and unclaimed seats are filled by someone who never
    /// listed them. Surplus auditors beyond capacity are unplaced, not
    /// outside.
    pub fn feasibility(&self, invalid_count: usize) -> FeasibilityBound {
        let capacity = self.total_capacity as i64;
        let auditors = self.auditor_count as i64;
        let claimed = capacity - self.unclaimed_capacity as i64;
        let valid = (auditors - invalid_count as i64).max(0);

        let placed = auditors.min(capacity);
        let satisfiable = valid.min(claimed);

        FeasibilityBound {
            margin: capacity - auditors,
            guaranteed_outside: (placed - satisfiable).max(0) as u64,
            guaranteed_unplaced: (auditors - capacity).max(0) as u64,
        }
    }
}

/// Aggregates per-posting demand by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandAnalyzer {
    required_count: usize,
}

impl DemandAnalyzer {
    pub fn new(required_count: usize) -> Self {
        Self { required_count }
    }

    /// Computes demand by rank, zero-demand postings and the rate curve.
    ///
    /// # Examples
    ///
    /// ```
    /// use affectation_core::{PostingCatalog, PostingRecord, PreferenceRow, PreferenceTable, ValidationRules};
    /// use affectation_solver::{DemandAnalyzer, PreferenceValidator};
    ///
    /// let catalog = PostingCatalog::build(&[
    ///     PostingRecord::new("Lyon", 1, ""),
    ///     PostingRecord::new("Metz", 2, ""),
    /// ])
    /// .unwrap();
    /// let table = PreferenceTable::new(vec![PreferenceRow::from_names("a1", ["Lyon"])]);
    /// let cleaned = PreferenceValidator::new(ValidationRules::free_choice(1)).validate(&table, &catalog);
    ///
    /// let report = DemandAnalyzer::new(1).analyze(&cleaned.table, &catalog);
    /// assert_eq!(report.zero_demand, ["Metz"]);
    /// assert_eq!(report.unclaimed_capacity, 2);
    /// ```
    pub fn analyze(&self, cleaned: &CleanedTable, catalog: &PostingCatalog) -> DemandReport {
        let required = self.required_count;
        let mut postings: Vec<PostingDemand> = catalog
            .postings()
            .iter()
            .map(|p| PostingDemand {
                name: p.name.clone(),
                capacity: p.capacity,
                category: p.category,
                by_rank: vec![0; required],
                overflow: 0,
            })
            .collect();

        for list in cleaned.valid() {
            for (rank, name) in list.choices.iter().enumerate() {
                let Some(k) = catalog.index_of(name) else {
                    continue;
                };
                let demand = &mut postings[k];
                match demand.by_rank.get_mut(rank) {
                    Some(count) => *count += 1,
                    None => demand.overflow += 1,
                }
            }
        }

        let mut zero_demand = Vec::new();
        let mut unclaimed_capacity = 0u64;
        for demand in postings.iter().filter(|d| d.total() == 0) {
            info!(
                event = "posting_unclaimed",
                posting = %demand.name,
                capacity = demand.capacity,
            );
            zero_demand.push(demand.name.clone());
            unclaimed_capacity += u64::from(demand.capacity);
        }

        let total_capacity = catalog.total_capacity() as u64;
        let auditor_count = cleaned.len();
        let rate_curve = (1..=required)
            .map(|n| {
                let claimed_capacity: u64 = postings
                    .iter()
                    .filter(|d| d.within(n) > 0)
                    .map(|d| u64::from(d.capacity))
                    .sum();
                rate_point(n, claimed_capacity, total_capacity, auditor_count)
            })
            .collect();

        info!(
            event = "demand_end",
            postings = postings.len(),
            zero_demand = zero_demand.len(),
            unclaimed_capacity = unclaimed_capacity,
            total_capacity = total_capacity,
        );

        DemandReport {
            postings,
            zero_demand,
            unclaimed_capacity,
            rate_curve,
            total_capacity,
            auditor_count,
        }
    }
}

fn rate_point(prefix_len: usize, claimed: u64, total_capacity: u64, auditors: usize) -> RatePoint {
    let capacity_share_pct = if total_capacity == 0 {
        0.0
    } else {
        100.0 * claimed as f64 / total_capacity as f64
    };
    let reachable_pct = if auditors == 0 {
        100.0
    } else {
        (100.0 * claimed as f64 / auditors as f64).min(100.0)
    };
    RatePoint {
        prefix_len,
        claimed_capacity: claimed,
        capacity_share_pct,
        reachable_pct,
    }
}
