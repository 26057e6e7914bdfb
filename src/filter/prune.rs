//! Greedy pruning of low-count rows and columns
//!
//! Repeatedly drops the weakest row or column until every remaining entry
//! reaches the threshold, or until one dimension has a single entry left.

use std::fmt;

use ndarray::Array1;

use crate::data::LabeledMatrix;
use crate::error::{PrepError, Result};

/// Axis along which an entry was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneAxis {
    Row,
    Column,
}

impl fmt::Display for PruneAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneAxis::Row => f.write_str("row"),
            PruneAxis::Column => f.write_str("column"),
        }
    }
}

/// One removal step
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub axis: PruneAxis,
    pub label: String,
    /// Row or column sum at the time of removal
    pub sum: f64,
}

/// Pruned matrix together with the removals that produced it
#[derive(Debug, Clone)]
pub struct PruneOutcome {
    pub matrix: LabeledMatrix,
    /// Removals in the order they were applied
    pub removals: Vec<Removal>,
    /// True when the loop stopped on a single remaining row or column
    pub stopped_by_guard: bool,
}

impl PruneOutcome {
    pub fn removed_rows(&self) -> Vec<&str> {
        self.removed(PruneAxis::Row)
    }

    pub fn removed_cols(&self) -> Vec<&str> {
        self.removed(PruneAxis::Column)
    }

    fn removed(&self, axis: PruneAxis) -> Vec<&str> {
        self.removals
            .iter()
            .filter(|r| r.axis == axis)
            .map(|r| r.label.as_str())
            .collect()
    }
}

/// Prune rows and columns until all entries are >= `threshold`
///
/// See [`prune_matrix_with_trace`] for the removal policy.
pub fn prune_matrix(matrix: &LabeledMatrix, threshold: f64) -> Result<LabeledMatrix> {
    prune_matrix_with_trace(matrix, threshold).map(|outcome| outcome.matrix)
}

/// Prune rows and columns until all entries are >= `threshold`, recording
/// each removal
///
/// Each iteration considers the rows and columns holding at least one entry
/// below `threshold`, picks the candidate row with the smallest row sum and
/// the candidate column with the smallest column sum (first index wins on
/// equal sums) and removes the row if its sum is <= the column's, otherwise
/// the column. Sums are recomputed on the current matrix every iteration.
///
/// The loop stops as soon as a removal leaves a single row or a single
/// column, even if entries below `threshold` remain. A removal never takes
/// the last row or the last column: on a matrix that already has a single
/// row (column) the other axis is pruned instead, and a 1x1 matrix is
/// returned as is.
pub fn prune_matrix_with_trace(matrix: &LabeledMatrix, threshold: f64) -> Result<PruneOutcome> {
    validate_input(matrix, threshold)?;

    let (n_rows, n_cols) = matrix.dim();
    let mut current = matrix.clone();
    let mut removals = Vec::new();
    let mut stopped_by_guard = false;

    while current.any_below(threshold) {
        let (rows, cols) = current.dim();
        if rows == 1 && cols == 1 {
            stopped_by_guard = true;
            break;
        }

        let values = current.values();
        let below = values.mapv(|x| x < threshold);
        let row_sums = current.row_sums();
        let col_sums = current.col_sums();

        let candidate_rows = below.rows().into_iter().map(|r| r.iter().any(|&b| b));
        let candidate_cols = below.columns().into_iter().map(|c| c.iter().any(|&b| b));

        // Both exist: some entry is below threshold
        let (row_idx, row_sum) = weakest(&row_sums, candidate_rows).ok_or_else(no_candidate)?;
        let (col_idx, col_sum) = weakest(&col_sums, candidate_cols).ok_or_else(no_candidate)?;

        let axis = if rows == 1 {
            PruneAxis::Column
        } else if cols == 1 || row_sum <= col_sum {
            PruneAxis::Row
        } else {
            PruneAxis::Column
        };

        let removal = match axis {
            PruneAxis::Row => {
                let label = current.row_labels()[row_idx].clone();
                current = current.without_row(row_idx);
                Removal { axis, label, sum: row_sum }
            }
            PruneAxis::Column => {
                let label = current.col_labels()[col_idx].clone();
                current = current.without_col(col_idx);
                Removal { axis, label, sum: col_sum }
            }
        };
        log::debug!(
            "Pruned {} '{}' (sum {}), {} x {} remaining",
            removal.axis,
            removal.label,
            removal.sum,
            current.n_rows(),
            current.n_cols()
        );
        removals.push(removal);

        if current.n_rows() == 1 || current.n_cols() == 1 {
            stopped_by_guard = true;
            break;
        }
    }

    if stopped_by_guard && current.any_below(threshold) {
        log::warn!(
            "Pruning stopped at {} x {} with entries still below {}",
            current.n_rows(),
            current.n_cols(),
            threshold
        );
    }

    log::info!(
        "Pruned {} x {} matrix to {} x {} ({} rows, {} columns removed)",
        n_rows,
        n_cols,
        current.n_rows(),
        current.n_cols(),
        n_rows - current.n_rows(),
        n_cols - current.n_cols()
    );

    Ok(PruneOutcome {
        matrix: current,
        removals,
        stopped_by_guard,
    })
}

fn validate_input(matrix: &LabeledMatrix, threshold: f64) -> Result<()> {
    if matrix.n_rows() == 0 || matrix.n_cols() == 0 {
        return Err(PrepError::InvalidInput {
            reason: format!(
                "Cannot prune a {} x {} matrix",
                matrix.n_rows(),
                matrix.n_cols()
            ),
        });
    }
    if matrix.values().iter().any(|x| !x.is_finite()) {
        return Err(PrepError::InvalidInput {
            reason: "Matrix contains non-numeric values".to_string(),
        });
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(PrepError::InvalidInput {
            reason: format!("Threshold must be a non-negative number, got {}", threshold),
        });
    }
    Ok(())
}

fn no_candidate() -> PrepError {
    PrepError::InvalidInput {
        reason: "No row or column below threshold to prune".to_string(),
    }
}

/// Candidate with the smallest sum; the lowest index wins on ties
fn weakest(sums: &Array1<f64>, candidates: impl Iterator<Item = bool>) -> Option<(usize, f64)> {
    sums.iter()
        .copied()
        .enumerate()
        .zip(candidates)
        .filter(|&(_, is_candidate)| is_candidate)
        .map(|(entry, _)| entry)
        .fold(None, |best: Option<(usize, f64)>, (idx, sum)| match best {
            Some((_, best_sum)) if best_sum <= sum => best,
            _ => Some((idx, sum)),
        })
}
