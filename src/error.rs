//! Error types for rust_pseudobulk

use thiserror::Error;

/// Main error type for preprocessing operations
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Schema error: {reason}")]
    SchemaError { reason: String },

    #[error("Shape error: {reason}")]
    ShapeError { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PrepError>;
