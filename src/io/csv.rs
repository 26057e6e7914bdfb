//! Delimited text reading and writing for matrices and result tables

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;

use crate::data::{ColumnValues, GroupedResults, LabeledMatrix, ResultTable};
use crate::error::{PrepError, Result};

/// Tab if the header line contains one, comma otherwise
fn detect_delimiter(path: &Path) -> Result<u8> {
    let mut header = String::new();
    BufReader::new(File::open(path)?).read_line(&mut header)?;
    if header.trim().is_empty() {
        return Err(PrepError::EmptyData {
            reason: format!("Empty file: {}", path.display()),
        });
    }
    Ok(if header.contains('\t') { b'\t' } else { b',' })
}

/// Read a labeled matrix from a CSV or TSV file
///
/// Expected format: header row with column labels (first cell is ignored),
/// then one row per feature with its label in the first column.
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<LabeledMatrix> {
    let path = path.as_ref();
    let delimiter = detect_delimiter(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let col_labels: Vec<String> = reader.headers()?.iter().skip(1).map(str::to_string).collect();
    let n_cols = col_labels.len();
    if n_cols == 0 {
        return Err(PrepError::InvalidInput {
            reason: "Not enough columns in header".to_string(),
        });
    }

    let mut row_labels = Vec::new();
    let mut data = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != n_cols + 1 {
            return Err(PrepError::InvalidInput {
                reason: format!(
                    "Row {} has {} columns, expected {}",
                    line + 2,
                    record.len(),
                    n_cols + 1
                ),
            });
        }

        let label = record.get(0).unwrap_or_default().to_string();
        for field in record.iter().skip(1) {
            let value = field.parse::<f64>().map_err(|_| PrepError::InvalidInput {
                reason: format!("Non-numeric value '{}' in row '{}'", field, label),
            })?;
            data.push(value);
        }
        row_labels.push(label);
    }

    if row_labels.is_empty() {
        return Err(PrepError::EmptyData {
            reason: "No rows found in matrix".to_string(),
        });
    }

    let values = Array2::from_shape_vec((row_labels.len(), n_cols), data).map_err(|e| {
        PrepError::InvalidInput {
            reason: e.to_string(),
        }
    })?;
    LabeledMatrix::new(values, row_labels, col_labels)
}

/// Write a labeled matrix as TSV
pub fn write_matrix<P: AsRef<Path>>(path: P, matrix: &LabeledMatrix) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    writer.write_record(std::iter::once("").chain(matrix.col_labels().iter().map(String::as_str)))?;
    for (i, label) in matrix.row_labels().iter().enumerate() {
        let mut record = vec![label.clone()];
        record.extend(matrix.row(i).iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one result table as TSV, feature names in the first column
pub fn write_table<P: AsRef<Path>>(path: P, table: &ResultTable) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    writer.write_record(std::iter::once("feature").chain(table.column_names()))?;
    for (i, feature) in table.row_names().iter().enumerate() {
        let mut record = vec![feature.clone()];
        for column in table.columns() {
            record.push(match &column.values {
                ColumnValues::Numeric(v) => format!("{:.6e}", v[i]),
                ColumnValues::Categorical(v) => v[i].clone(),
            });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every table as `<dir>/<comparison>/<cluster>.tsv`
pub fn write_grouped_tables<P: AsRef<Path>>(dir: P, results: &GroupedResults) -> Result<()> {
    let dir = dir.as_ref();
    for comparison in results.comparisons() {
        let comparison_dir = dir.join(&comparison.name);
        std::fs::create_dir_all(&comparison_dir)?;
        for cluster in &comparison.clusters {
            write_table(comparison_dir.join(format!("{}.tsv", cluster.name)), &cluster.table)?;
        }
    }
    Ok(())
}
