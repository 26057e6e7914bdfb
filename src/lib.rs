//! rust_pseudobulk: count matrix pruning and pooled p-value adjustment
//!
//! Preprocessing helpers for per-cluster differential expression workflows:
//!
//! - [`filter::prune_matrix`] greedily drops the weakest rows and columns of a
//!   count matrix until every remaining entry reaches a minimum count.
//! - [`testing::adjust_globally`] re-adjusts per-cluster marker tables with a
//!   correction pooled across all comparisons of each cluster.
//!
//! # Example
//!
//! ```ignore
//! use rust_pseudobulk::prelude::*;
//!
//! let counts = read_matrix("pseudobulk_counts.tsv")?;
//! let pruned = prune_matrix(&counts, 10.0)?;
//!
//! let markers = read_grouped_results("markers.json")?;
//! let adjusted = adjust_globally(&markers)?;
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod filter;
pub mod io;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{Column, ColumnValues, Comparison, GroupedResults, LabeledMatrix, ResultTable};
    pub use crate::error::{PrepError, Result};
    pub use crate::filter::{prune_matrix, prune_matrix_with_trace, PruneAxis, PruneOutcome};
    pub use crate::io::{
        read_grouped_results, read_matrix, write_grouped_results, write_grouped_tables, write_matrix,
        write_table,
    };
    pub use crate::testing::{
        adjust_globally, adjust_globally_with, benjamini_hochberg, p_adjust, GlobalAdjustParams,
        PAdjustMethod,
    };
}
