//! Minimum-cost bipartite matching.
//!
//! [`ShortestAugmentingPath`] is the Hungarian method in its shortest
//! augmenting path form with row and column potentials (the Jonker-Volgenant
//! family): one Dijkstra-like search per row of the smaller side, O(n²·m)
//! overall. Output is fully determined by the input matrix; among equal
//! reduced costs the lowest column index is taken.

use crate::cost::CostMatrix;

/// One-to-one matching between matrix rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Matching {
    /// Column matched to each row.
    pub row_to_col: Vec<Option<usize>>,
    /// Row matched to each column.
    pub col_to_row: Vec<Option<usize>>,
    pub total_cost: f64,
}

impl Matching {
    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            row_to_col: vec![None; rows],
            col_to_row: vec![None; cols],
            total_cost: 0.0,
        }
    }

    /// Number of matched pairs, the smaller matrix dimension.
    pub fn len(&self) -> usize {
        self.row_to_col.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matched `(row, col)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|c| (row, c)))
    }
}

/// Solves the rectangular assignment problem.
///
/// Implementations must match every row of the smaller side and reach the
/// global minimum of the summed cost.
pub trait AssignmentSolver: Send + Sync {
    fn solve(&self, costs: &CostMatrix) -> Matching;
}

/// Hungarian method with potentials over shortest augmenting paths.
///
/// # Examples
///
/// ```
/// use affectation_solver::{AssignmentSolver, CostMatrix, ShortestAugmentingPath};
///
/// let costs = CostMatrix::from_rows(&[
///     vec![4.0, 1.0, 6.0],
///     vec![2.0, 0.0, 5.0],
/// ])
/// .unwrap();
///
/// let matching = ShortestAugmentingPath.solve(&costs);
/// assert_eq!(matching.row_to_col, [Some(1), Some(0)]);
/// assert_eq!(matching.col_to_row, [Some(1), Some(0), None]);
/// assert_eq!(matching.total_cost, 3.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestAugmentingPath;

impl AssignmentSolver for ShortestAugmentingPath {
    fn solve(&self, costs: &CostMatrix) -> Matching {
        let (rows, cols) = costs.shape();
        if rows == 0 || cols == 0 {
            return Matching::empty(rows, cols);
        }

        if rows <= cols {
            let row_to_col = hungarian(costs);
            finish(costs, row_to_col)
        } else {
            let col_to_row = hungarian(&costs.transposed());
            let mut row_to_col = vec![None; rows];
            for (col, row) in col_to_row.iter().enumerate() {
                if let Some(row) = *row {
                    row_to_col[row] = Some(col);
                }
            }
            finish(costs, row_to_col)
        }
    }
}

fn finish(costs: &CostMatrix, row_to_col: Vec<Option<usize>>) -> Matching {
    let mut col_to_row = vec![None; costs.cols()];
    let mut total_cost = 0.0;
    for (row, col) in row_to_col.iter().enumerate() {
        if let Some(col) = *col {
            col_to_row[col] = Some(row);
            total_cost += costs.get(row, col);
        }
    }
    Matching {
        row_to_col,
        col_to_row,
        total_cost,
    }
}

// Requires rows <= cols. Index 0 of the column arrays is a virtual column
// holding the row being inserted; real rows and columns are 1-based.
fn hungarian(costs: &CostMatrix) -> Vec<Option<usize>> {
    let (n, m) = costs.shape();
    let a = costs.as_array();

    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0usize;
        let mut min_v = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = a[[i0 - 1, j - 1]] - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![None; n];
    for j in 1..=m {
        if owner[j] != 0 {
            row_to_col[owner[j] - 1] = Some(j - 1);
        }
    }
    row_to_col
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
