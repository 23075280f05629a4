//! Affectation Solver Engine
//!
//! This crate turns validated preference tables into optimal assignments:
//! - Preference validation with precedence-ordered rules
//! - Demand statistics and the assignment-rate curve
//! - Cost matrix construction with capacity-column expansion
//! - Minimum-cost rectangular matching
//! - Result interpretation and satisfaction statistics
//! - The end-to-end `run` pipeline

pub mod assignment;
pub mod cost;
pub mod demand;
pub mod interpret;
pub mod pipeline;
pub mod validator;

pub use assignment::{AssignmentSolver, Matching, ShortestAugmentingPath};
pub use cost::{CostMatrix, CostMatrixBuilder, MatrixError};
pub use demand::{DemandAnalyzer, DemandReport, FeasibilityBound, PostingDemand, RatePoint};
pub use interpret::{
    AssignmentReport, Placement, ResultInterpreter, SatisfactionSummary, SatisfiedRank, Vacancy,
};
pub use pipeline::{run, solve_shape, RunOutcome, ShapeRun};
pub use validator::{PreferenceValidator, ValidationOutcome};
