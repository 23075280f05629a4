//! Tests for preference validation.

use super::*;
use affectation_core::{AuditorId, QuotaRules};
use affectation_test::{catalog, row, table};
use proptest::prelude::*;

fn tagged_catalog() -> PostingCatalog {
    catalog(&[
        ("Lyon", 2, ""),
        ("Metz", 1, "noir"),
        ("Nice", 1, "noir"),
        ("Pau", 1, "noir"),
        ("Rodez", 1, "rouge"),
        ("Sens", 1, "rouge"),
        ("Tulle", 1, "vert"),
        ("Vichy", 1, ""),
    ])
}

fn validator(required: usize) -> PreferenceValidator {
    PreferenceValidator::new(ValidationRules::new(required, QuotaRules::default()))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_short_list_is_insufficient() {
    let catalog = tagged_catalog();
    let table = table(&[
        ("short", &["Lyon", "Metz", "Tulle"]),
        ("ok", &["Lyon", "Metz", "Tulle", "Vichy", "Rodez", "Sens"]),
    ]);

    let outcome = validator(6).validate(&table, &catalog);

    assert_eq!(outcome.valid_count, 1);
    assert_eq!(outcome.invalid_count, 1);
    let short = outcome.table.get(&AuditorId::from("short")).unwrap();
    assert!(short.choices.is_empty());
    assert_eq!(short.declared.len(), 3);
    assert_eq!(
        short.invalidation,
        Some(Invalidation::Insufficient {
            declared: 3,
            required: 6
        })
    );
    assert_eq!(outcome.count_by_reason(InvalidReason::Insufficient), 1);
}

#[test]
fn test_first_unknown_name_is_reported() {
    let declared = names(&["Lyon", "Brest", "Metz", "Arles"]);
    assert_eq!(
        validator(2).check(&declared, &tagged_catalog()),
        Err(Invalidation::Unknown {
            posting: "Brest".to_string()
        })
    );
}

#[test]
fn test_duplicate_reported_after_existence() {
    let catalog = tagged_catalog();
    assert_eq!(
        validator(2).check(&names(&["Lyon", "Vichy", "Lyon"]), &catalog),
        Err(Invalidation::Duplicate {
            posting: "Lyon".to_string()
        })
    );
    // Existence wins over uniqueness.
    assert!(matches!(
        validator(2).check(&names(&["Lyon", "Lyon", "Brest"]), &catalog),
        Err(Invalidation::Unknown { .. })
    ));
}

#[test]
fn test_length_wins_over_everything() {
    assert!(matches!(
        validator(4).check(&names(&["Brest", "Brest"]), &tagged_catalog()),
        Err(Invalidation::Insufficient { .. })
    ));
}

#[test]
fn test_quota_counts_only_required_window() {
    let catalog = tagged_catalog();

    // Third restricted entry sits outside the window of 3.
    let declared = names(&["Metz", "Nice", "Lyon", "Pau"]);
    assert_eq!(validator(3).check(&declared, &catalog), Ok(()));

    let declared = names(&["Metz", "Nice", "Pau", "Lyon"]);
    assert_eq!(
        validator(3).check(&declared, &catalog),
        Err(Invalidation::Quota {
            restricted: 3,
            discouraged: 0,
            preferred: 0
        })
    );
}

#[test]
fn test_combined_restricted_discouraged_quota() {
    let catalog = tagged_catalog();
    let declared = names(&["Metz", "Nice", "Rodez", "Sens", "Lyon"]);
    assert_eq!(validator(5).check(&declared, &catalog), Ok(()));

    let quotas = QuotaRules {
        restricted_max: 2,
        restricted_or_discouraged_max: 3,
        preferred_min: 0,
    };
    let strict = PreferenceValidator::new(ValidationRules::new(5, quotas));
    assert!(matches!(
        strict.check(&declared, &catalog),
        Err(Invalidation::Quota {
            restricted: 2,
            discouraged: 2,
            ..
        })
    ));
}

#[test]
fn test_preferred_minimum() {
    let catalog = tagged_catalog();
    let quotas = QuotaRules {
        preferred_min: 1,
        ..QuotaRules::default()
    };
    let validator = PreferenceValidator::new(ValidationRules::new(2, quotas));

    assert!(validator.check(&names(&["Lyon", "Vichy", "Tulle"]), &catalog).is_err());
    assert!(validator.check(&names(&["Lyon", "Tulle"]), &catalog).is_ok());
}

#[test]
fn test_free_choice_skips_quotas() {
    let catalog = tagged_catalog();
    let validator = PreferenceValidator::new(ValidationRules::free_choice(3));
    assert_eq!(
        validator.check(&names(&["Metz", "Nice", "Pau"]), &catalog),
        Ok(())
    );
}

#[test]
fn test_overflow_counts_long_valid_lists() {
    let catalog = tagged_catalog();
    let table = table(&[
        ("exact", &["Lyon", "Vichy"]),
        ("long", &["Lyon", "Vichy", "Tulle"]),
        ("long_invalid", &["Lyon", "Vichy", "Brest"]),
    ]);

    let outcome = validator(2).validate(&table, &catalog);
    assert_eq!(outcome.valid_count, 2);
    assert_eq!(outcome.overflow_count, 1);
}

#[test]
fn test_annotations_and_gaps_are_normalized() {
    let catalog = tagged_catalog();
    let table = PreferenceTable::new(vec![affectation_core::PreferenceRow::new(
        "a1",
        vec![
            Some(" Lyon ".to_string()),
            None,
            Some("Vichy // family".to_string()),
        ],
    )]);

    let outcome = validator(2).validate(&table, &catalog);
    assert_eq!(outcome.valid_count, 1);
    assert_eq!(outcome.table.lists[0].choices, ["Lyon", "Vichy"]);
}

#[test]
fn test_revalidation_keeps_classification() {
    let catalog = tagged_catalog();
    let table = table(&[
        ("a", &["Lyon", "Vichy", "Tulle"]),
        ("b", &["Lyon"]),
        ("c", &["Metz", "Nice", "Pau"]),
        ("d", &["Lyon", "Lyon", "Tulle"]),
    ]);

    let first = validator(3).validate(&table, &catalog);
    let second = validator(3).validate(&first.table.to_table(), &catalog);

    let validity = |o: &ValidationOutcome| o.table.iter().map(|l| l.is_valid()).collect::<Vec<_>>();
    assert_eq!(validity(&first), validity(&second));
    assert_eq!(first.valid_count, second.valid_count);
}

const POOL: [&str; 8] = ["Lyon", "Metz", "Nice", "Pau", "Rodez", "Sens", "Tulle", "Vichy"];

proptest! {
    #[test]
    fn prop_accepts_iff_all_rules_hold(
        picks in prop::collection::vec(0usize..10, 0..9),
        required in 1usize..6,
    ) {
        let catalog = tagged_catalog();
        let declared: Vec<String> = picks
            .iter()
            .map(|&i| POOL.get(i).map_or_else(|| format!("Unknown{i}"), |s| s.to_string()))
            .collect();

        let long_enough = declared.len() >= required;
        let all_exist = declared.iter().all(|n| catalog.contains(n));
        let unique = declared.iter().collect::<HashSet<_>>().len() == declared.len();
        let window = &declared[..required.min(declared.len())];
        let count = |c: Category| window.iter().filter(|n| catalog.is_member(n, c)).count();
        let quotas_ok = QuotaRules::default().admits(
            count(Category::Restricted),
            count(Category::Discouraged),
            count(Category::Preferred),
        );

        let accepted = validator(required).check(&declared, &catalog).is_ok();
        prop_assert_eq!(accepted, long_enough && all_exist && unique && quotas_ok);
    }

    #[test]
    fn prop_revalidation_is_idempotent(
        lists in prop::collection::vec(prop::collection::vec(0usize..9, 0..7), 1..12),
        required in 1usize..5,
    ) {
        let catalog = tagged_catalog();
        let rows = lists
            .iter()
            .enumerate()
            .map(|(a, picks)| {
                let names: Vec<&str> = picks.iter().map(|&i| POOL.get(i).copied().unwrap_or("Brest")).collect();
                row(&format!("a{a}"), &names)
            })
            .collect();
        let table = PreferenceTable::new(rows);

        let first = validator(required).validate(&table, &catalog);
        let second = validator(required).validate(&first.table.to_table(), &catalog);

        prop_assert_eq!(first.valid_count, second.valid_count);
        for (a, b) in first.table.iter().zip(second.table.iter()) {
            prop_assert_eq!(a.is_valid(), b.is_valid());
            prop_assert_eq!(&a.choices, &b.choices);
        }
    }
}
