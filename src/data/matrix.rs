//! Labeled numeric matrix for count data

use std::collections::HashSet;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{PrepError, Result};

/// Reject duplicated labels along one axis
fn check_unique(labels: &[String], axis_name: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(PrepError::InvalidInput {
                reason: format!("Duplicate {} label '{}'", axis_name, label),
            });
        }
    }
    Ok(())
}

/// A 2D numeric matrix with labeled rows and columns
/// Rows are typically features (genes), columns are samples or cells
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    /// Numeric values (rows x columns)
    values: Array2<f64>,
    /// Row labels
    row_labels: Vec<String>,
    /// Column labels
    col_labels: Vec<String>,
}

impl LabeledMatrix {
    /// Create a new labeled matrix
    ///
    /// Labels must match the array shape and be unique along each axis.
    /// All entries must be finite numbers.
    pub fn new(values: Array2<f64>, row_labels: Vec<String>, col_labels: Vec<String>) -> Result<Self> {
        let (n_rows, n_cols) = values.dim();

        if row_labels.len() != n_rows {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} row labels", n_rows),
                got: format!("{} row labels", row_labels.len()),
            });
        }

        if col_labels.len() != n_cols {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} column labels", n_cols),
                got: format!("{} column labels", col_labels.len()),
            });
        }

        if let Some(((i, j), _)) = values.indexed_iter().find(|(_, x)| !x.is_finite()) {
            return Err(PrepError::InvalidInput {
                reason: format!(
                    "Non-numeric value at row '{}', column '{}'",
                    row_labels[i], col_labels[j]
                ),
            });
        }

        check_unique(&row_labels, "row")?;
        check_unique(&col_labels, "column")?;

        Ok(Self {
            values,
            row_labels,
            col_labels,
        })
    }

    /// Create from integer counts
    pub fn from_integers(
        counts: Array2<u32>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
    ) -> Result<Self> {
        Self::new(counts.mapv(f64::from), row_labels, col_labels)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// (rows, columns)
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values as a view
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.row(idx)
    }

    pub fn column(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(idx)
    }

    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    pub fn col_index(&self, label: &str) -> Option<usize> {
        self.col_labels.iter().position(|l| l == label)
    }

    /// Value at (row label, column label)
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.row_index(row)?;
        let j = self.col_index(col)?;
        Some(self.values[[i, j]])
    }

    /// Sum of every row
    pub fn row_sums(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(1))
    }

    /// Sum of every column
    pub fn col_sums(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(0))
    }

    /// Smallest entry, `None` for an empty matrix
    pub fn min_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    /// Whether any entry is strictly below `threshold`
    pub fn any_below(&self, threshold: f64) -> bool {
        self.values.iter().any(|&x| x < threshold)
    }

    /// Subset to specific rows, keeping their given order
    pub fn select_rows(&self, row_indices: &[usize]) -> Self {
        Self {
            values: self.values.select(Axis(0), row_indices),
            row_labels: row_indices.iter().map(|&i| self.row_labels[i].clone()).collect(),
            col_labels: self.col_labels.clone(),
        }
    }

    /// Subset to specific columns, keeping their given order
    pub fn select_cols(&self, col_indices: &[usize]) -> Self {
        Self {
            values: self.values.select(Axis(1), col_indices),
            row_labels: self.row_labels.clone(),
            col_labels: col_indices.iter().map(|&j| self.col_labels[j].clone()).collect(),
        }
    }

    /// Copy without the row at `idx`
    pub fn without_row(&self, idx: usize) -> Self {
        let keep: Vec<usize> = (0..self.n_rows()).filter(|&i| i != idx).collect();
        self.select_rows(&keep)
    }

    /// Copy without the column at `idx`
    pub fn without_col(&self, idx: usize) -> Self {
        let keep: Vec<usize> = (0..self.n_cols()).filter(|&j| j != idx).collect();
        self.select_cols(&keep)
    }
}
