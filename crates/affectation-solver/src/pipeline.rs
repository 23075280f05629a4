//! End-to-end assignment run.
//!
//! Configuration errors abort the run before any matrix is built. Everything
//! else is reported as data: invalid lists, unclaimed postings, placements
//! outside preferences and unplaced auditors.

use std::collections::HashMap;
use std::time::Instant;

use affectation_config::EngineConfig;
use affectation_core::{
    apply_overrides, CleanedTable, ConfigError, CostShape, PostingCatalog, PostingRecord,
    PreferenceList, PreferenceOverride, PreferenceTable, ValidationRules,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::info;

use crate::assignment::{AssignmentSolver, ShortestAugmentingPath};
use crate::cost::CostMatrixBuilder;
use crate::demand::{DemandAnalyzer, DemandReport, FeasibilityBound};
use crate::interpret::{AssignmentReport, ResultInterpreter};
use crate::validator::{PreferenceValidator, ValidationOutcome};

/// Report of one cost shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRun {
    pub shape: CostShape,
    pub report: AssignmentReport,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub catalog: PostingCatalog,
    pub rules: ValidationRules,
    /// Table after overrides, before validation.
    pub preferences: PreferenceTable,
    pub validation: ValidationOutcome,
    pub demand: DemandReport,
    pub feasibility: FeasibilityBound,
    /// One run per configured shape, in configuration order.
    pub runs: Vec<ShapeRun>,
}

impl RunOutcome {
    pub fn run_for(&self, shape: CostShape) -> Option<&AssignmentReport> {
        self.runs.iter().find(|r| r.shape == shape).map(|r| &r.report)
    }
}

/// Runs validation, demand analysis and one assignment per cost shape.
///
/// # Errors
///
/// Returns [`ConfigError`] for an invalid configuration, posting table or
/// duplicated auditor id, and when `default_penalty` does not exceed the
/// cost of the last entry of the longest valid list under some shape.
///
/// # Examples
///
/// ```
/// use affectation_config::EngineConfig;
/// use affectation_core::{PostingRecord, PreferenceRow, PreferenceTable};
/// use affectation_solver::run;
///
/// let postings = [
///     PostingRecord::new("Lyon", 1, ""),
///     PostingRecord::new("Metz", 1, ""),
/// ];
/// let preferences = PreferenceTable::new(vec![
///     PreferenceRow::from_names("a1", ["Lyon", "Metz"]),
///     PreferenceRow::from_names("a2", ["Lyon", "Metz"]),
/// ]);
/// let config = EngineConfig::new().with_required_count(2);
///
/// let outcome = run(&postings, &preferences, &[], &config).unwrap();
/// let report = &outcome.runs[0].report;
/// assert_eq!(report.placements.len(), 2);
/// assert_eq!(report.summary.mean_rank, Some(1.5));
/// ```
pub fn run(
    postings: &[PostingRecord],
    preferences: &PreferenceTable,
    overrides: &[PreferenceOverride],
    config: &EngineConfig,
) -> Result<RunOutcome, ConfigError> {
    config.validate()?;

    info!(
        event = "run_start",
        postings = postings.len(),
        auditors = preferences.len(),
        overrides = overrides.len(),
        shapes = config.cost_shapes.len(),
        seed = config.seed,
    );
    let started = Instant::now();

    let catalog = PostingCatalog::build(postings)?;
    preferences.ensure_unique_auditors()?;
    let rules = config.rules(preferences.width());
    let preferences = apply_overrides(preferences, overrides);

    let validation = PreferenceValidator::new(rules).validate(&preferences, &catalog);
    let demand = DemandAnalyzer::new(rules.required_count).analyze(&validation.table, &catalog);
    let feasibility = demand.feasibility(validation.invalid_count);
    ensure_penalty_dominates(&validation.table, &config.cost_shapes, config.default_penalty)?;

    // Shapes share the cleaned table read-only.
    let table = &validation.table;
    let runs = config
        .cost_shapes
        .par_iter()
        .map(|&shape| {
            solve_shape(&catalog, table, shape, config.default_penalty, config.seed)
                .map(|report| ShapeRun { shape, report })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        event = "run_end",
        shapes = runs.len(),
        valid = validation.valid_count,
        invalid = validation.invalid_count,
        guaranteed_outside = feasibility.guaranteed_outside,
        guaranteed_unplaced = feasibility.guaranteed_unplaced,
        duration_ms = started.elapsed().as_millis() as u64,
    );

    Ok(RunOutcome {
        catalog,
        rules,
        preferences,
        validation,
        demand,
        feasibility,
        runs,
    })
}

/// Builds, solves and interprets the matrix of one cost shape.
///
/// Rows are the cleaned lists in the order of a `seed`-driven shuffle;
/// placements come back in table order.
pub fn solve_shape(
    catalog: &PostingCatalog,
    table: &CleanedTable,
    shape: CostShape,
    default_penalty: f64,
    seed: u64,
) -> Result<AssignmentReport, ConfigError> {
    let rows = shuffled_rows(table, seed);
    let builder = CostMatrixBuilder::new(catalog, shape, default_penalty)
        .map_err(|e| ConfigError::InvalidParameter(e.to_string()))?;
    let costs = builder.build_rows(&rows);

    info!(
        event = "solve_start",
        shape = %shape,
        rows = costs.rows(),
        columns = costs.cols(),
    );
    let started = Instant::now();

    let matching = ShortestAugmentingPath.solve(&costs);
    let mut report = ResultInterpreter::new(catalog).interpret(&matching, &rows);

    let position: HashMap<_, _> = table
        .iter()
        .enumerate()
        .map(|(i, list)| (&list.auditor, i))
        .collect();
    report
        .placements
        .sort_by_key(|p| position.get(&p.auditor).copied().unwrap_or(usize::MAX));
    report
        .unplaced
        .sort_by_key(|a| position.get(a).copied().unwrap_or(usize::MAX));

    info!(
        event = "solve_end",
        shape = %shape,
        total_cost = report.summary.total_cost,
        mean_rank = report.summary.mean_rank.unwrap_or(0.0),
        within_top_3_pct = report.summary.within_top_3_pct,
        outside = report.summary.outside_count,
        unplaced = report.summary.unplaced,
        duration_ms = started.elapsed().as_millis() as u64,
    );

    Ok(report)
}

/// Fails when an in-list cell would cost at least as much as an unranked one.
fn ensure_penalty_dominates(
    table: &CleanedTable,
    shapes: &[CostShape],
    default_penalty: f64,
) -> Result<(), ConfigError> {
    let longest = table.valid().map(|list| list.choices.len()).max().unwrap_or(0);
    if longest == 0 {
        return Ok(());
    }
    for &shape in shapes {
        let cost = shape.cost(longest - 1);
        if cost >= default_penalty {
            return Err(ConfigError::InvalidParameter(format!(
                "default_penalty {default_penalty} does not exceed the {shape} cost {cost} \
                 of rank {longest}; raise it above every in-list cost"
            )));
        }
    }
    Ok(())
}

fn shuffled_rows(table: &CleanedTable, seed: u64) -> Vec<&PreferenceList> {
    let mut rows: Vec<&PreferenceList> = table.iter().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
    rows
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
