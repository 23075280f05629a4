//! Affectation - Optimal Posting Assignment in Rust
//!
//! Validates each auditor's ranked preference list, measures demand per
//! posting, and solves a minimum-cost matching that never exceeds a
//! posting's capacity.
//!
//! # Example
//!
//! ```rust
//! use affectation::prelude::*;
//!
//! let postings = [
//!     PostingRecord::new("Lyon", 1, "unrestricted"),
//!     PostingRecord::new("Metz", 1, "green"),
//! ];
//! let preferences = PreferenceTable::new(vec![
//!     PreferenceRow::from_names("a1", ["Metz", "Lyon"]),
//!     PreferenceRow::from_names("a2", ["Metz", "Lyon"]),
//! ]);
//! let config = EngineConfig::new().with_required_count(2);
//!
//! let outcome = assign_with(&postings, &preferences, &[], &config).unwrap();
//! let report = outcome.run_for(CostShape::Linear).unwrap();
//! assert_eq!(report.summary.outside_count, 0);
//! assert_eq!(report.summary.within_top_3_pct, 100.0);
//! ```

// Domain types
pub use affectation_core::{
    apply_overrides, AuditorId, Category, CleanedTable, ConfigError, CostShape, InvalidReason,
    Invalidation, Posting, PostingCatalog, PostingRecord, PreferenceList, PreferenceOverride,
    PreferenceRow, PreferenceTable, QuotaRules, ValidationRules,
};

// Configuration
pub use affectation_config::{EngineConfig, LoadError};

// Engine components
pub use affectation_solver::{
    run, solve_shape, AssignmentReport, AssignmentSolver, CostMatrix, CostMatrixBuilder,
    DemandAnalyzer, DemandReport, FeasibilityBound, Matching, MatrixError, Placement,
    PostingDemand, PreferenceValidator, RatePoint, ResultInterpreter, RunOutcome,
    SatisfactionSummary, SatisfiedRank, ShapeRun, ShortestAugmentingPath, ValidationOutcome,
    Vacancy,
};

#[cfg(feature = "console")]
pub use affectation_console as console;

mod engine;
pub use engine::{assign, assign_with, CONFIG_FILE};

pub mod prelude {
    pub use super::{assign, assign_with};
    pub use super::{
        AssignmentReport, AuditorId, Category, ConfigError, CostShape, EngineConfig,
        PostingRecord, PreferenceOverride, PreferenceRow, PreferenceTable, QuotaRules,
        RunOutcome, SatisfiedRank,
    };
}
