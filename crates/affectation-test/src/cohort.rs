//! Seeded synthetic cohorts.
//!
//! Postings get Zipf-like popularity: low-index postings are demanded far
//! more often than high-index ones, so generated cohorts show the skew of a
//! real promotion (a few oversubscribed postings and a tail nobody lists).
//!
//! # Example
//!
//! ```
//! use affectation_test::cohort::CohortSpec;
//!
//! let cohort = CohortSpec::default().with_auditors(20).generate();
//! assert_eq!(cohort.preferences.len(), 20);
//! assert_eq!(cohort, CohortSpec::default().with_auditors(20).generate());
//! ```

use std::ops::RangeInclusive;

use affectation_core::{PostingRecord, PreferenceRow, PreferenceTable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Parameters of a synthetic cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortSpec {
    pub postings: usize,
    pub capacity: RangeInclusive<i64>,
    pub auditors: usize,
    /// Entries declared by a regular auditor.
    pub list_len: usize,
    /// Probability that an auditor declares one entry fewer than `list_len`.
    pub short_list_rate: f64,
    pub seed: u64,
}

impl Default for CohortSpec {
    fn default() -> Self {
        Self {
            postings: 30,
            capacity: 1..=6,
            auditors: 80,
            list_len: 8,
            short_list_rate: 0.05,
            seed: 42,
        }
    }
}

/// Generated input tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub postings: Vec<PostingRecord>,
    pub preferences: PreferenceTable,
}

impl CohortSpec {
    pub fn with_postings(mut self, postings: usize) -> Self {
        self.postings = postings;
        self
    }

    pub fn with_capacity(mut self, capacity: RangeInclusive<i64>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_auditors(mut self, auditors: usize) -> Self {
        self.auditors = auditors;
        self
    }

    pub fn with_list_len(mut self, list_len: usize) -> Self {
        self.list_len = list_len;
        self
    }

    pub fn with_short_list_rate(mut self, rate: f64) -> Self {
        self.short_list_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generates the cohort. Identical specs yield identical cohorts.
    pub fn generate(&self) -> Cohort {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let postings: Vec<PostingRecord> = (0..self.postings)
            .map(|k| {
                let capacity = rng.random_range(self.capacity.clone());
                PostingRecord::new(posting_name(k), capacity, category_tag(k))
            })
            .collect();

        let weights: Vec<f64> = (0..self.postings).map(|k| 1.0 / (k as f64 + 1.0)).collect();

        let rows = (0..self.auditors)
            .map(|a| {
                let len = if rng.random_bool(self.short_list_rate.clamp(0.0, 1.0)) {
                    self.list_len.saturating_sub(1)
                } else {
                    self.list_len
                };
                let picks = weighted_order(&weights, &mut rng);
                PreferenceRow::from_names(
                    format!("A{a:03}"),
                    picks.into_iter().take(len).map(posting_name),
                )
            })
            .collect();

        Cohort {
            postings,
            preferences: PreferenceTable::new(rows),
        }
    }
}

/// Name of the posting at index `k`.
pub fn posting_name(k: usize) -> String {
    format!("P{k:02}")
}

fn category_tag(k: usize) -> &'static str {
    match k % 6 {
        1 => "noir",
        3 => "rouge",
        4 => "vert",
        _ => "",
    }
}

// Weighted sampling without replacement: each index draws an exponential
// race time scaled by its weight, and indices are taken in arrival order.
fn weighted_order(weights: &[f64], rng: &mut ChaCha8Rng) -> Vec<usize> {
    let mut keyed: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .map(|(k, w)| {
            let u: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
            (-u.ln() / w, k)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, k)| k).collect()
}
