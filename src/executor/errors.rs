//! Executor error types
//!
//! Error codes:
//! - CAMPUS_RESULT_TOO_LARGE (REJECT)
//! - CAMPUS_STORAGE_UNAVAILABLE (ERROR)

use std::fmt;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected, nothing is wrong with the system
    Reject,
    /// Operation failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Raw match count exceeded the cap
    CampusResultTooLarge,
    /// Dataset records could not be listed
    CampusStorageUnavailable,
}

impl ExecutorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::CampusResultTooLarge => "CAMPUS_RESULT_TOO_LARGE",
            ExecutorErrorCode::CampusStorageUnavailable => "CAMPUS_STORAGE_UNAVAILABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::CampusResultTooLarge => Severity::Reject,
            ExecutorErrorCode::CampusStorageUnavailable => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Dataset the query ran against, if applicable
    dataset: Option<String>,
}

impl ExecutorError {
    /// Create a result too large error
    pub fn result_too_large(limit: usize) -> Self {
        Self {
            code: ExecutorErrorCode::CampusResultTooLarge,
            message: format!("Query matched more than {} records", limit),
            dataset: None,
        }
    }

    /// Create a storage unavailable error
    pub fn storage_unavailable(dataset: impl Into<String>, reason: impl Into<String>) -> Self {
        let dataset = dataset.into();
        Self {
            code: ExecutorErrorCode::CampusStorageUnavailable,
            message: format!("Dataset '{}' unavailable: {}", dataset, reason.into()),
            dataset: Some(dataset),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the dataset if applicable
    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
