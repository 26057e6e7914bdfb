//! Data structures for matrices and grouped test results

mod grouped;
mod matrix;
mod table;

pub use grouped::{ClusterResult, Comparison, GroupedResults};
pub use matrix::LabeledMatrix;
pub use table::{Column, ColumnValues, ResultTable};
