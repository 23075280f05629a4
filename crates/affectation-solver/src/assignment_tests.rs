//! Tests for the assignment solver.

use super::*;
use proptest::prelude::*;

fn matrix(rows: &[&[f64]]) -> CostMatrix {
    let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
    CostMatrix::from_rows(&rows).unwrap()
}

// Minimum over every injective map from the smaller side into the larger one.
fn brute_force(costs: &CostMatrix) -> f64 {
    fn search(
        costs: &CostMatrix,
        transpose: bool,
        row: usize,
        taken: &mut [bool],
        acc: f64,
        best: &mut f64,
    ) {
        let (small, large) = if transpose {
            (costs.cols(), costs.rows())
        } else {
            (costs.rows(), costs.cols())
        };
        if row == small {
            if acc < *best {
                *best = acc;
            }
            return;
        }
        for other in 0..large {
            if taken[other] {
                continue;
            }
            let cost = if transpose {
                costs.get(other, row)
            } else {
                costs.get(row, other)
            };
            taken[other] = true;
            search(costs, transpose, row + 1, taken, acc + cost, best);
            taken[other] = false;
        }
    }

    let transpose = costs.rows() > costs.cols();
    let large = costs.rows().max(costs.cols());
    let mut best = f64::INFINITY;
    search(costs, transpose, 0, &mut vec![false; large], 0.0, &mut best);
    if best.is_infinite() {
        0.0
    } else {
        best
    }
}

fn assert_one_to_one(matching: &Matching) {
    for (row, col) in matching.pairs() {
        assert_eq!(matching.col_to_row[col], Some(row));
    }
    let matched_cols = matching.col_to_row.iter().flatten().count();
    assert_eq!(matched_cols, matching.len());
}

#[test]
fn test_unique_optimum_four_by_four() {
    // Optimum 0->2, 1->1, 2->0, 3->3 with cost 2+3+1+4 = 10; every other
    // permutation costs at least 11.
    let costs = matrix(&[
        &[9.0, 8.0, 2.0, 7.0],
        &[6.0, 3.0, 8.0, 9.0],
        &[1.0, 7.0, 9.0, 8.0],
        &[8.0, 9.0, 7.0, 4.0],
    ]);

    let matching = ShortestAugmentingPath.solve(&costs);

    assert_eq!(matching.row_to_col, [Some(2), Some(1), Some(0), Some(3)]);
    assert_eq!(matching.total_cost, 10.0);
    assert_eq!(matching.total_cost, brute_force(&costs));
    assert_one_to_one(&matching);
}

#[test]
fn test_wide_matrix_leaves_columns_free() {
    let costs = matrix(&[&[5.0, 1.0, 5.0, 5.0], &[5.0, 1.0, 2.0, 5.0]]);
    let matching = ShortestAugmentingPath.solve(&costs);

    assert_eq!(matching.row_to_col, [Some(1), Some(2)]);
    assert_eq!(matching.col_to_row, [None, Some(0), Some(1), None]);
    assert_eq!(matching.total_cost, 3.0);
}

#[test]
fn test_tall_matrix_leaves_rows_unmatched() {
    let costs = matrix(&[&[3.0, 9.0], &[1.0, 9.0], &[9.0, 2.0]]);
    let matching = ShortestAugmentingPath.solve(&costs);

    assert_eq!(matching.row_to_col, [None, Some(0), Some(1)]);
    assert_eq!(matching.len(), 2);
    assert_eq!(matching.total_cost, 3.0);
    assert_one_to_one(&matching);
}

#[test]
fn test_empty_dimensions() {
    let matching = ShortestAugmentingPath.solve(&matrix(&[]));
    assert!(matching.is_empty());
    assert_eq!(matching.total_cost, 0.0);

    let wide = CostMatrix::from_array(ndarray::Array2::zeros((0, 3))).unwrap();
    let matching = ShortestAugmentingPath.solve(&wide);
    assert_eq!(matching.col_to_row, [None, None, None]);
}

#[test]
fn test_same_input_same_output() {
    let costs = matrix(&[&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]]);
    let first = ShortestAugmentingPath.solve(&costs);
    for _ in 0..5 {
        assert_eq!(ShortestAugmentingPath.solve(&costs), first);
    }
}

#[test]
fn test_penalty_scale_costs() {
    let p = 1e9;
    let costs = matrix(&[&[0.0, p, p], &[0.0, 1.0, p], &[0.0, 1.0, 2.0]]);
    let matching = ShortestAugmentingPath.solve(&costs);
    assert_eq!(matching.row_to_col, [Some(0), Some(1), Some(2)]);
    assert_eq!(matching.total_cost, 3.0);
}

fn cost_matrix() -> impl Strategy<Value = CostMatrix> {
    (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(0u8..20, rows * cols).prop_map(move |cells| {
            let rows: Vec<Vec<f64>> = cells
                .chunks(cols)
                .map(|chunk| chunk.iter().map(|&c| f64::from(c)).collect())
                .collect();
            CostMatrix::from_rows(&rows).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn prop_matches_brute_force(costs in cost_matrix()) {
        let matching = ShortestAugmentingPath.solve(&costs);
        prop_assert_eq!(matching.len(), costs.rows().min(costs.cols()));
        prop_assert_eq!(matching.total_cost, brute_force(&costs));
        for (row, col) in matching.pairs() {
            prop_assert_eq!(matching.col_to_row[col], Some(row));
        }
    }
}
