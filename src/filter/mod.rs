//! Filtering of count matrices

mod prune;

pub use prune::{prune_matrix, prune_matrix_with_trace, PruneAxis, PruneOutcome, Removal};
