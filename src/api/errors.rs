//! API error types
//!
//! API errors collapse subsystem errors into the external contract:
//! every validation failure becomes `CAMPUS_QUERY_INVALID` with the uniform
//! "Invalid query" message, while the internal reason stays in the logs.

use std::fmt;

use crate::dataset::DatasetError;
use crate::executor::{ExecutorError, ExecutorErrorCode};
use crate::query::QueryError;

/// API error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller sent something unacceptable
    Reject,
    /// Operation failed on our side
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

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Query failed validation
    CampusQueryInvalid,
    /// Query matched more records than allowed
    CampusResultTooLarge,
    /// Dataset id is not registered
    CampusDatasetNotFound,
    /// Dataset id or content was rejected
    CampusDatasetInvalid,
    /// Storage or serialization failure
    CampusInternal,
}

impl ApiErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::CampusQueryInvalid => "CAMPUS_QUERY_INVALID",
            ApiErrorCode::CampusResultTooLarge => "CAMPUS_RESULT_TOO_LARGE",
            ApiErrorCode::CampusDatasetNotFound => "CAMPUS_DATASET_NOT_FOUND",
            ApiErrorCode::CampusDatasetInvalid => "CAMPUS_DATASET_INVALID",
            ApiErrorCode::CampusInternal => "CAMPUS_INTERNAL",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            ApiErrorCode::CampusInternal => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error as shown to callers
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
}

impl ApiError {
    fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an invalid query error. The reason is never surfaced.
    pub fn invalid_query() -> Self {
        Self::new(
            ApiErrorCode::CampusQueryInvalid,
            crate::query::INVALID_QUERY_MESSAGE,
        )
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::CampusInternal, reason)
    }

    /// Create from a query validation error
    pub fn from_query_error(err: &QueryError) -> Self {
        Self::new(ApiErrorCode::CampusQueryInvalid, err.public_message())
    }

    /// Create from an executor error
    pub fn from_executor_error(err: &ExecutorError) -> Self {
        match err.code() {
            ExecutorErrorCode::CampusResultTooLarge => {
                Self::new(ApiErrorCode::CampusResultTooLarge, err.message())
            }
            ExecutorErrorCode::CampusStorageUnavailable => Self::internal(err.message()),
        }
    }

    /// Create from a dataset registry error
    pub fn from_dataset_error(err: &DatasetError) -> Self {
        let code = match err {
            DatasetError::NotFound(_) => ApiErrorCode::CampusDatasetNotFound,
            DatasetError::InvalidId(_)
            | DatasetError::DuplicateId(_)
            | DatasetError::NoValidRecords(_) => ApiErrorCode::CampusDatasetInvalid,
            DatasetError::Io { .. } | DatasetError::Serialize(_) => ApiErrorCode::CampusInternal,
        };
        Self::new(code, err.to_string())
    }

    /// Returns the error code
    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::from_query_error(&err)
    }
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        Self::from_executor_error(&err)
    }
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        Self::from_dataset_error(&err)
    }
}

impl fmt::Display for ApiError {
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

impl std::error::Error for ApiError {}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_hides_reason() {
        let err = ApiError::from(QueryError::invalid("APPLY key 'x' is not numeric"));
        assert_eq!(err.code().code(), "CAMPUS_QUERY_INVALID");
        assert_eq!(err.message(), "Invalid query");
        assert_eq!(err, ApiError::invalid_query());
    }

    #[test]
    fn test_executor_error_mapping() {
        let too_large = ApiError::from(ExecutorError::result_too_large(5000));
        assert_eq!(too_large.code(), ApiErrorCode::CampusResultTooLarge);
        assert_eq!(too_large.severity(), Severity::Reject);

        let storage = ApiError::from(ExecutorError::storage_unavailable("courses", "gone"));
        assert_eq!(storage.code(), ApiErrorCode::CampusInternal);
        assert_eq!(storage.severity(), Severity::Error);
    }

    #[test]
    fn test_dataset_error_mapping() {
        let cases = [
            (DatasetError::NotFound("x".into()), "CAMPUS_DATASET_NOT_FOUND"),
            (DatasetError::InvalidId("a_b".into()), "CAMPUS_DATASET_INVALID"),
            (DatasetError::DuplicateId("x".into()), "CAMPUS_DATASET_INVALID"),
            (DatasetError::NoValidRecords("x".into()), "CAMPUS_DATASET_INVALID"),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code().code(), code);
        }
    }

    #[test]
    fn test_display() {
        let display = format!("{}", ApiError::internal("disk full"));
        assert_eq!(display, "[ERROR] CAMPUS_INTERNAL: disk full");
    }
}
