//! Dataset registry errors

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised while managing registered datasets
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Id is empty, whitespace-only, or contains '_'
    #[error("Invalid dataset id: '{0}'")]
    InvalidId(String),

    /// Id already registered
    #[error("Dataset already exists: {0}")]
    DuplicateId(String),

    /// Id not registered
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// Input held nothing that normalizes into a record
    #[error("Dataset '{0}' contains no valid records")]
    NoValidRecords(String),

    /// Filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Record serialization failure
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DatasetError {
    /// Wraps an I/O error with the path it occurred on
    pub fn io(path: &Path, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            DatasetError::InvalidId(_) => "CAMPUS_DATASET_INVALID_ID",
            DatasetError::DuplicateId(_) => "CAMPUS_DATASET_EXISTS",
            DatasetError::NotFound(_) => "CAMPUS_DATASET_NOT_FOUND",
            DatasetError::NoValidRecords(_) => "CAMPUS_DATASET_EMPTY",
            DatasetError::Io { .. } => "CAMPUS_DATASET_IO",
            DatasetError::Serialize(_) => "CAMPUS_DATASET_IO",
        }
    }
}
