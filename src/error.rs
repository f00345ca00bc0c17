use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required field '{field}' missing from header of {}", path.display())]
    Schema { path: PathBuf, field: String },

    #[error("Malformed timestamp in {} at line {line}: '{raw}'", path.display())]
    MalformedTimestamp {
        path: PathBuf,
        line: u64,
        raw: String,
    },

    #[error("Malformed {field} value in {} at line {line}: '{raw}'", path.display())]
    MalformedValue {
        path: PathBuf,
        line: u64,
        field: String,
        raw: String,
    },

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// True for errors raised by a single corrupt row of a matched station.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::MalformedTimestamp { .. } | ProcessingError::MalformedValue { .. }
        )
    }
}
