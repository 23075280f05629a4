//! Synthetic Cohort Demo
//!
//! Generates a promotion of auditors with skewed preferences over a set of
//! postings, then assigns them with every cost shape and prints how each
//! shape trades first choices against placements far down the lists.
//!
//! Usage: `cargo run -p cohort -- [auditors] [seed]`

use affectation::prelude::*;
use affectation_test::CohortSpec;

fn main() {
    let mut args = std::env::args().skip(1);
    let auditors = args.next().and_then(|a| a.parse().ok()).unwrap_or(120);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let cohort = CohortSpec::default()
        .with_postings(40)
        .with_auditors(auditors)
        .with_seed(seed)
        .generate();

    let config = EngineConfig::new()
        .with_cost_shapes(CostShape::ALL)
        .with_seed(seed);

    // A few auditors negotiated shorter lists.
    let overrides = [
        PreferenceOverride::new("A003", 6),
        PreferenceOverride::new("A010", 5),
    ];

    let outcome = match assign_with(&cohort.postings, &cohort.preferences, &overrides, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("configuration rejected: {e}");
            std::process::exit(1);
        }
    };

    print_demand(&outcome);
    for shape_run in &outcome.runs {
        print_report(shape_run.shape, &shape_run.report);
    }
}

fn print_demand(outcome: &RunOutcome) {
    println!("\nMost demanded postings:");
    for demand in outcome.demand.most_demanded(5) {
        println!(
            "  {:<6} {:>3} seats  {:>3} listings  {:>3} first choices",
            demand.name,
            demand.capacity,
            demand.total(),
            demand.first_choice()
        );
    }

    println!("\nAssignment-rate upper bound:");
    for point in &outcome.demand.rate_curve {
        println!(
            "  top {:<2} {:>5.1}% of seats listed  {:>5.1}% of auditors reachable",
            point.prefix_len, point.capacity_share_pct, point.reachable_pct
        );
    }
    println!(
        "  at least {} auditors will land outside their lists, {} without a seat",
        outcome.feasibility.guaranteed_outside, outcome.feasibility.guaranteed_unplaced
    );
}

fn print_report(shape: CostShape, report: &AssignmentReport) {
    let summary = &report.summary;
    println!("\n{shape}:");
    println!(
        "  mean rank {:.2}  top-3 {:.1}%  top-4 {:.1}%  outside {}  unplaced {}",
        summary.mean_rank.unwrap_or(0.0),
        summary.within_top_3_pct,
        summary.within_top_4_pct,
        summary.outside_count,
        summary.unplaced
    );
    let histogram: Vec<String> = summary
        .rank_histogram
        .iter()
        .map(|(rank, count)| format!("{rank}:{count}"))
        .collect();
    println!("  ranks {}", histogram.join(" "));
    let open: usize = report.open_postings().map(|v| v.remaining() as usize).sum();
    println!("  {open} seats left open");
}
