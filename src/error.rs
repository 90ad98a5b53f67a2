//! Error types for eddy-mht
//!
//! Container failures are fatal for the operation that hit them; nothing is retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// eddy-mht error types
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (Parquet/Arrow/JSON container)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A named array expected in the container is absent
    #[error("Missing array in container: {0}")]
    MissingArray(String),

    /// Container content cannot be decoded into tracks
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// Row width disagreement inside one stored batch
    #[error("Width mismatch in track {track}: expected {expected} columns, found {found}")]
    WidthMismatch {
        /// Index of the offending track matrix
        track: usize,
        /// Width established by the batch
        expected: usize,
        /// Width actually found
        found: usize,
    },

    /// Invalid argument (unknown node, bad attachment, empty timeline)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
