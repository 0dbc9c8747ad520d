//! Startup error types
//!
//! Everything that can go wrong while fetching and decoding the two data
//! files. These are fatal: the dashboard has nothing to serve without its
//! dataset, so `main` reports the error and exits.

use thiserror::Error;

/// Errors raised while loading the dataset
#[derive(Error, Debug)]
pub enum LoadError {
    /// HTTP client could not be constructed
    #[error("failed to set up HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure talking to a remote source
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote source answered with a non-success status
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Local source could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Description table is not valid CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Point table is not a readable Arrow IPC / Feather file
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A required column is absent
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// A column exists but holds a type we can't interpret
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    /// A non-null value could not be interpreted
    #[error("column '{column}' row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        reason: String,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;
