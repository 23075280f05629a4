//! Tests for the end-to-end run.

use super::*;
use crate::interpret::SatisfiedRank;
use affectation_config::DEFAULT_PENALTY;
use affectation_core::{AuditorId, InvalidReason, PreferenceRow};
use affectation_test::{records, table, CohortSpec};
use proptest::prelude::*;

fn config() -> EngineConfig {
    EngineConfig::new()
        .with_required_count(3)
        .with_cost_shapes(CostShape::ALL)
}

fn small_postings() -> Vec<PostingRecord> {
    records(&[
        ("Lyon", 2, ""),
        ("Metz", 1, "noir"),
        ("Nice", 1, "rouge"),
        ("Pau", 2, "vert"),
        ("Albi", 0, ""),
    ])
}

#[test]
fn test_full_run() {
    let preferences = table(&[
        ("a1", &["Lyon", "Metz", "Pau"]),
        ("a2", &["Lyon", "Pau", "Nice"]),
        ("a3", &["Lyon", "Nice", "Metz"]),
        ("a4", &["Metz", "Lyon", "Pau", "Nice"]),
        ("a5", &["Lyon"]),
    ]);

    let outcome = run(&small_postings(), &preferences, &[], &config()).unwrap();

    assert_eq!(outcome.catalog.len(), 4);
    assert_eq!(outcome.catalog.total_capacity(), 6);
    assert_eq!(outcome.validation.valid_count, 4);
    assert_eq!(outcome.validation.invalid_count, 1);
    assert_eq!(outcome.validation.overflow_count, 1);
    assert_eq!(
        outcome.validation.count_by_reason(InvalidReason::Insufficient),
        1
    );
    assert!(outcome.demand.zero_demand.is_empty());

    assert_eq!(outcome.runs.len(), 3);
    let shapes: Vec<CostShape> = outcome.runs.iter().map(|r| r.shape).collect();
    assert_eq!(shapes, CostShape::ALL);

    for shape_run in &outcome.runs {
        let report = &shape_run.report;
        assert_eq!(report.placements.len(), 5);
        let order: Vec<&str> = report.placements.iter().map(|p| p.auditor.as_str()).collect();
        assert_eq!(order, ["a1", "a2", "a3", "a4", "a5"]);

        for vacancy in &report.vacancies {
            assert!(vacancy.filled <= vacancy.capacity);
        }
        let a5 = report.placement_of(&AuditorId::from("a5")).unwrap();
        assert_eq!(a5.rank, SatisfiedRank::OutsidePreferences);
        assert_eq!(report.summary.outside_count, 1);
    }

    let linear = outcome.run_for(CostShape::Linear).unwrap();
    assert_eq!(
        linear.placement_of(&AuditorId::from("a4")).unwrap().rank,
        SatisfiedRank::Preference(1)
    );
}

#[test]
fn test_config_error_aborts_before_validation() {
    let preferences = table(&[("a1", &["Lyon"])]);

    let duplicate = records(&[("Lyon", 1, ""), ("Lyon", 2, "")]);
    assert!(matches!(
        run(&duplicate, &preferences, &[], &config()),
        Err(ConfigError::DuplicatePosting { .. })
    ));

    let unknown_tag = records(&[("Lyon", 1, "purple")]);
    assert!(matches!(
        run(&unknown_tag, &preferences, &[], &config()),
        Err(ConfigError::UnknownCategory { .. })
    ));

    let bad_config = config().with_default_penalty(-5.0);
    assert!(matches!(
        run(&small_postings(), &preferences, &[], &bad_config),
        Err(ConfigError::InvalidParameter(_))
    ));
}

#[test]
fn test_override_truncates_before_validation() {
    let preferences = table(&[
        ("a1", &["Lyon", "Metz", "Pau", "Nice"]),
        ("a2", &["Lyon", "Metz", "Pau", "Nice"]),
    ]);
    let overrides = [
        PreferenceOverride::new("a1", 3),
        PreferenceOverride::new("a2", 2),
        PreferenceOverride::new("ghost", 1),
    ];

    let outcome = run(&small_postings(), &preferences, &overrides, &config()).unwrap();

    let a1 = outcome.validation.table.get(&AuditorId::from("a1")).unwrap();
    assert!(a1.is_valid());
    assert_eq!(a1.choices, ["Lyon", "Metz", "Pau"]);
    let a2 = outcome.validation.table.get(&AuditorId::from("a2")).unwrap();
    assert!(!a2.is_valid());
    assert_eq!(outcome.validation.overflow_count, 0);
    assert_eq!(outcome.preferences.rows[1].declared(), ["Lyon", "Metz"]);
}

#[test]
fn test_free_choice_uses_table_width() {
    let preferences = PreferenceTable::new(vec![
        PreferenceRow::from_names("a1", ["Metz", "Nice", "Lyon"]),
        PreferenceRow::new(
            "a2",
            vec![Some("Lyon".to_string()), Some("Pau".to_string()), None],
        ),
    ]);
    let config = config().with_required_count(1).with_free_choice(true);

    let outcome = run(&small_postings(), &preferences, &[], &config).unwrap();

    assert_eq!(outcome.rules.required_count, 3);
    assert!(outcome.rules.quotas.is_none());
    assert_eq!(outcome.validation.valid_count, 1);
    assert_eq!(outcome.demand.rate_curve.len(), 3);
}

#[test]
fn test_invalid_auditors_keep_penalty_rows() {
    let preferences = table(&[("short", &["Lyon", "Metz"]), ("ok", &["Pau", "Lyon", "Nice"])]);

    let outcome = run(&small_postings(), &preferences, &[], &config()).unwrap();

    assert_eq!(outcome.validation.invalid_count, 1);
    assert_eq!(outcome.feasibility.guaranteed_outside, 1);
    let report = outcome.run_for(CostShape::Linear).unwrap();
    let short = report.placement_of(&AuditorId::from("short")).unwrap();
    assert_eq!(short.rank, SatisfiedRank::OutsidePreferences);
    assert_eq!(report.summary.total_cost, DEFAULT_PENALTY);
}

#[test]
fn test_same_seed_same_result() {
    let cohort = CohortSpec::default().with_auditors(40).generate();
    let config = EngineConfig::new().with_seed(11);

    let first = run(&cohort.postings, &cohort.preferences, &[], &config).unwrap();
    let second = run(&cohort.postings, &cohort.preferences, &[], &config).unwrap();

    assert_eq!(first.runs, second.runs);
}

#[test]
fn test_more_auditors_than_capacity() {
    let cohort = CohortSpec::default()
        .with_postings(5)
        .with_capacity(1..=1)
        .with_auditors(8)
        .with_list_len(3)
        .with_short_list_rate(0.0)
        .generate();
    let config = EngineConfig::new().with_free_choice(true);

    let outcome = run(&cohort.postings, &cohort.preferences, &[], &config).unwrap();
    let report = &outcome.runs[0].report;

    assert_eq!(report.placements.len(), 5);
    assert_eq!(report.unplaced.len(), 3);
    assert!(report.vacancies.iter().all(|v| v.remaining() == 0));
    assert_eq!(outcome.feasibility.margin, -3);
    assert_eq!(outcome.feasibility.guaranteed_unplaced, 3);
    assert!(report.summary.outside_count >= outcome.feasibility.guaranteed_outside as usize);
}

#[test]
fn test_duplicate_auditor_id_aborts_run() {
    let preferences = table(&[
        ("a1", &["Lyon", "Metz", "Pau"]),
        ("a1", &["Metz", "Lyon", "Pau"]),
    ]);

    let err = run(&small_postings(), &preferences, &[], &config()).unwrap_err();

    assert_eq!(
        err,
        ConfigError::DuplicateAuditor {
            auditor: "a1".to_string()
        }
    );
}

/// 22 auditors each want one seat of a 23-entry list held by a 23rd auditor,
/// plus one spare seat nobody listed.
fn long_list_cohort() -> (Vec<PostingRecord>, PreferenceTable) {
    let names: Vec<String> = (0..23).map(|i| format!("P{i}")).collect();
    let mut postings: Vec<PostingRecord> = names
        .iter()
        .map(|name| PostingRecord::new(name.as_str(), 1, ""))
        .collect();
    postings.push(PostingRecord::new("X", 1, ""));

    let mut rows: Vec<PreferenceRow> = names[..22]
        .iter()
        .enumerate()
        .map(|(i, name)| PreferenceRow::from_names(format!("b{i}"), [name.as_str()]))
        .collect();
    rows.push(PreferenceRow::from_names("long", names.iter().map(String::as_str)));

    (postings, PreferenceTable::new(rows))
}

#[test]
fn test_long_lists_stay_inside_preferences_with_default_penalty() {
    let (postings, preferences) = long_list_cohort();
    let config = EngineConfig::new()
        .with_required_count(1)
        .with_cost_shapes(vec![CostShape::Linear, CostShape::Exponential]);

    let outcome = run(&postings, &preferences, &[], &config).unwrap();

    for shape_run in &outcome.runs {
        let report = &shape_run.report;
        assert_eq!(report.summary.outside_count, 0, "{}", shape_run.shape);
        assert_eq!(
            report.placement_of(&AuditorId::from("long")).unwrap().rank,
            SatisfiedRank::Preference(23),
            "{}",
            shape_run.shape
        );
        let open: Vec<&str> = report.open_postings().map(|v| v.posting.as_str()).collect();
        assert_eq!(open, ["X"]);
    }
}

#[test]
fn test_penalty_below_in_list_cost_is_rejected() {
    let (postings, preferences) = long_list_cohort();
    let config = EngineConfig::new()
        .with_required_count(1)
        .with_cost_shapes(vec![CostShape::Linear, CostShape::Exponential])
        .with_default_penalty(1e9);

    let err = run(&postings, &preferences, &[], &config).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidParameter(ref msg) if msg.contains("exp")));

    // The same penalty is fine for a shape that stays below it.
    let linear = config.with_cost_shapes(vec![CostShape::Linear]);
    assert!(run(&postings, &preferences, &[], &linear).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_capacity_never_exceeded(
        seed in any::<u64>(),
        postings in 1usize..12,
        auditors in 0usize..30,
    ) {
        let cohort = CohortSpec::default()
            .with_postings(postings)
            .with_capacity(0..=3)
            .with_auditors(auditors)
            .with_list_len(4)
            .with_seed(seed)
            .generate();
        let config = EngineConfig::new()
            .with_required_count(2)
            .with_cost_shapes(CostShape::ALL)
            .with_seed(seed);

        let outcome = run(&cohort.postings, &cohort.preferences, &[], &config).unwrap();

        for shape_run in &outcome.runs {
            let report = &shape_run.report;
            for vacancy in &report.vacancies {
                prop_assert!(vacancy.filled <= vacancy.capacity);
            }
            let expected = auditors.min(outcome.catalog.total_capacity());
            prop_assert_eq!(report.placements.len(), expected);
            prop_assert_eq!(report.placements.len() + report.unplaced.len(), auditors);
        }
    }
}
