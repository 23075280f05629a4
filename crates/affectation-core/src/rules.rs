//! Validation rules for preference lists.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Category quotas, counted over the first `required_count` entries of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", default))]
pub struct QuotaRules {
    /// Maximum number of restricted postings.
    pub restricted_max: usize,

    /// Maximum number of restricted and discouraged postings combined.
    pub restricted_or_discouraged_max: usize,

    /// Minimum number of preferred postings.
    pub preferred_min: usize,
}

impl Default for QuotaRules {
    fn default() -> Self {
        Self {
            restricted_max: 2,
            restricted_or_discouraged_max: 4,
            preferred_min: 0,
        }
    }
}

impl QuotaRules {
    /// Returns true if the given category counts satisfy every quota.
    pub fn admits(&self, restricted: usize, discouraged: usize, preferred: usize) -> bool {
        restricted <= self.restricted_max
            && restricted + discouraged <= self.restricted_or_discouraged_max
            && preferred >= self.preferred_min
    }
}

/// Rules resolved for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    /// Minimum list length, also the width of the quota window.
    pub required_count: usize,

    /// `None` disables the quota check (free-choice mode).
    pub quotas: Option<QuotaRules>,
}

impl ValidationRules {
    pub fn new(required_count: usize, quotas: QuotaRules) -> Self {
        Self {
            required_count,
            quotas: Some(quotas),
        }
    }

    /// Rules without category quotas.
    pub fn free_choice(required_count: usize) -> Self {
        Self {
            required_count,
            quotas: None,
        }
    }
}
