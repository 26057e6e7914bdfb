//! Input/Output helpers for matrices and grouped results

mod csv;
mod results;

pub use self::csv::{read_matrix, write_grouped_tables, write_matrix, write_table};
pub use results::{read_grouped_results, write_grouped_results};
