//! Result tables produced by per-cluster differential testing

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Values held by one column of a result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValues {
    /// Numeric statistics (p-values, fold changes, percentages)
    ///
    /// Missing values are NaN in memory and `null` on the wire.
    Numeric(#[serde(with = "nullable_floats")] Vec<f64>),
    /// Categorical annotations (gene symbols, directions)
    Categorical(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Categorical(_) => None,
        }
    }
}

/// NaN <-> null, since JSON has no NaN literal
mod nullable_floats {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            if value.is_nan() {
                seq.serialize_element(&None::<f64>)?;
            } else {
                seq.serialize_element(value)?;
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn categorical(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            values: ColumnValues::Categorical(values),
        }
    }
}

/// Ordered table of named columns, one row per tested feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Feature identifiers, one per row
    row_names: Vec<String>,
    /// Columns in display order
    columns: Vec<Column>,
}

impl ResultTable {
    /// Create a table, checking every column has one value per row
    /// and that column names are unique
    pub fn new(row_names: Vec<String>, columns: Vec<Column>) -> Result<Self> {
        let mut table = Self {
            row_names,
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Number of rows (features)
    pub fn n_rows(&self) -> usize {
        self.row_names.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by name
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric column by name
    ///
    /// Fails with a schema error if the column is missing or categorical.
    pub fn numeric_column(&self, name: &str) -> Result<&[f64]> {
        let column = self.column(name).ok_or_else(|| PrepError::SchemaError {
            reason: format!("Missing column '{}'", name),
        })?;
        column.values.as_numeric().ok_or_else(|| PrepError::SchemaError {
            reason: format!("Column '{}' is not numeric", name),
        })
    }

    /// Append a column at the end
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        let position = self.columns.len();
        self.insert_column(position, column)
    }

    /// Insert a column at `position`; columns from `position` on shift right
    pub fn insert_column(&mut self, position: usize, column: Column) -> Result<()> {
        if position > self.columns.len() {
            return Err(PrepError::SchemaError {
                reason: format!(
                    "Cannot insert column '{}' at position {} in a table with {} columns",
                    column.name,
                    position,
                    self.columns.len()
                ),
            });
        }
        self.check_new_column(&column)?;
        self.columns.insert(position, column);
        Ok(())
    }

    /// Re-check column lengths and name uniqueness, e.g. after deserialization
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(PrepError::SchemaError {
                    reason: format!("Column '{}' appears more than once", column.name),
                });
            }
            if column.values.len() != self.n_rows() {
                return Err(PrepError::SchemaError {
                    reason: format!(
                        "Column '{}' has {} values, table has {} rows",
                        column.name,
                        column.values.len(),
                        self.n_rows()
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_new_column(&self, column: &Column) -> Result<()> {
        if self.column_position(&column.name).is_some() {
            return Err(PrepError::SchemaError {
                reason: format!("Column '{}' already exists", column.name),
            });
        }
        if column.values.len() != self.n_rows() {
            return Err(PrepError::SchemaError {
                reason: format!(
                    "Column '{}' has {} values, table has {} rows",
                    column.name,
                    column.values.len(),
                    self.n_rows()
                ),
            });
        }
        Ok(())
    }
}
