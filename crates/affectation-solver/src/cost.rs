//! Cost matrix construction.
//!
//! Each posting is expanded into `capacity` interchangeable columns so a
//! capacitated assignment becomes a one-to-one matching: a posting can never
//! receive more auditors than it has columns.

use affectation_core::{CleanedTable, CostShape, PostingCatalog, PreferenceList};
use ndarray::Array2;
use thiserror::Error;

/// Rejected matrix contents.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("cost at ({row}, {col}) is negative: {value}")]
    NegativeCell { row: usize, col: usize, value: f64 },

    #[error("cost at ({row}, {col}) is not finite")]
    NonFiniteCell { row: usize, col: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("default penalty must be finite and non-negative, got {0}")]
    InvalidPenalty(f64),
}

/// Dense auditor × capacity-unit cost grid. Every cell is finite and
/// non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    cells: Array2<f64>,
}

impl CostMatrix {
    /// Wraps an existing array after checking every cell.
    pub fn from_array(cells: Array2<f64>) -> Result<Self, MatrixError> {
        for ((row, col), &value) in cells.indexed_iter() {
            if !value.is_finite() {
                return Err(MatrixError::NonFiniteCell { row, col });
            }
            if value < 0.0 {
                return Err(MatrixError::NegativeCell { row, col, value });
            }
        }
        Ok(Self { cells })
    }

    /// Builds a matrix from row vectors.
    ///
    /// ```
    /// use affectation_solver::CostMatrix;
    ///
    /// let costs = CostMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    /// assert_eq!(costs.shape(), (2, 2));
    /// assert_eq!(costs.get(1, 0), 3.0);
    /// ```
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Array2::zeros((rows.len(), width));
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MatrixError::Ragged {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                cells[[r, c]] = value;
            }
        }
        Self::from_array(cells)
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[[row, col]]
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.cells
    }

    /// Swaps rows and columns.
    pub fn transposed(&self) -> Self {
        Self {
            cells: self.cells.t().to_owned(),
        }
    }
}

/// Writes rank costs into the column blocks of a catalog.
#[derive(Debug, Clone, Copy)]
pub struct CostMatrixBuilder<'a> {
    catalog: &'a PostingCatalog,
    shape: CostShape,
    default_penalty: f64,
}

impl<'a> CostMatrixBuilder<'a> {
    /// `default_penalty` must exceed every in-list cost of `shape` for the
    /// list lengths involved; this is not checked.
    pub fn new(
        catalog: &'a PostingCatalog,
        shape: CostShape,
        default_penalty: f64,
    ) -> Result<Self, MatrixError> {
        if !default_penalty.is_finite() || default_penalty < 0.0 {
            return Err(MatrixError::InvalidPenalty(default_penalty));
        }
        Ok(Self {
            catalog,
            shape,
            default_penalty,
        })
    }

    pub fn shape(&self) -> CostShape {
        self.shape
    }

    /// One row per list, in the given order.
    ///
    /// Invalid lists have no choices and keep a row of penalties.
    pub fn build_rows(&self, lists: &[&PreferenceList]) -> CostMatrix {
        let mut cells =
            Array2::from_elem((lists.len(), self.catalog.total_capacity()), self.default_penalty);

        for (row, list) in lists.iter().enumerate() {
            for (rank, name) in list.choices.iter().enumerate() {
                let Some(columns) = self.catalog.columns_of(name) else {
                    continue;
                };
                let cost = self.shape.cost(rank);
                for col in columns {
                    cells[[row, col]] = cost;
                }
            }
        }

        CostMatrix { cells }
    }

    /// One row per list of `table`, in table order.
    pub fn build(&self, table: &CleanedTable) -> CostMatrix {
        let lists: Vec<&PreferenceList> = table.iter().collect();
        self.build_rows(&lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PreferenceValidator;
    use affectation_core::{QuotaRules, ValidationRules};
    use affectation_test::{catalog, table};

    const PENALTY: f64 = 1e9;

    #[test]
    fn test_columns_follow_capacity() {
        let catalog = catalog(&[("Lyon", 2, ""), ("Metz", 1, ""), ("Albi", 0, "")]);
        let builder = CostMatrixBuilder::new(&catalog, CostShape::Linear, PENALTY).unwrap();
        let costs = builder.build(&CleanedTable::default());
        assert_eq!(costs.shape(), (0, 3));
    }

    #[test]
    fn test_rank_costs_fill_whole_block() {
        let catalog = catalog(&[("Lyon", 2, ""), ("Metz", 1, ""), ("Nice", 2, "")]);
        let outcome = PreferenceValidator::new(ValidationRules::free_choice(2))
            .validate(&table(&[("a1", &["Nice", "Lyon"])]), &catalog);

        let costs = CostMatrixBuilder::new(&catalog, CostShape::Square, PENALTY)
            .unwrap()
            .build(&outcome.table);

        let row: Vec<f64> = (0..costs.cols()).map(|c| costs.get(0, c)).collect();
        assert_eq!(row, [1.0, 1.0, PENALTY, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_list_keeps_penalty_row() {
        let catalog = catalog(&[("Lyon", 1, ""), ("Metz", 1, "")]);
        let outcome = PreferenceValidator::new(ValidationRules::new(6, QuotaRules::default()))
            .validate(&table(&[("short", &["Lyon", "Metz"])]), &catalog);
        assert_eq!(outcome.invalid_count, 1);

        let costs = CostMatrixBuilder::new(&catalog, CostShape::Linear, PENALTY)
            .unwrap()
            .build(&outcome.table);
        assert!(costs.as_array().iter().all(|&c| c == PENALTY));
    }

    #[test]
    fn test_entries_beyond_required_are_rank_costed() {
        let catalog = catalog(&[("Lyon", 1, ""), ("Metz", 1, ""), ("Nice", 1, "")]);
        let outcome = PreferenceValidator::new(ValidationRules::new(1, QuotaRules::default()))
            .validate(&table(&[("a1", &["Lyon", "Metz", "Nice"])]), &catalog);

        let costs = CostMatrixBuilder::new(&catalog, CostShape::Exponential, PENALTY)
            .unwrap()
            .build(&outcome.table);
        assert_eq!(costs.get(0, 2), 2f64.exp());
    }

    #[test]
    fn test_from_array_rejects_bad_cells() {
        assert_eq!(
            CostMatrix::from_rows(&[vec![0.0, -1.0]]),
            Err(MatrixError::NegativeCell {
                row: 0,
                col: 1,
                value: -1.0
            })
        );
        assert!(matches!(
            CostMatrix::from_rows(&[vec![f64::NAN]]),
            Err(MatrixError::NonFiniteCell { row: 0, col: 0 })
        ));
        assert!(matches!(
            CostMatrix::from_rows(&[vec![1.0, 2.0], vec![1.0]]),
            Err(MatrixError::Ragged { row: 1, .. })
        ));
    }

    #[test]
    fn test_builder_rejects_bad_penalty() {
        let catalog = catalog(&[("Lyon", 1, "")]);
        assert!(CostMatrixBuilder::new(&catalog, CostShape::Linear, f64::INFINITY).is_err());
        assert!(CostMatrixBuilder::new(&catalog, CostShape::Linear, -1.0).is_err());
    }
}
