//! API response types
//!
//! One JSON object per response:
//! `{"status":"ok","data":...}` or `{"status":"error","code":...,"message":...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;
use crate::executor::Row;

/// Success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    pub data: Value,
}

impl SuccessResponse {
    /// Create a new success response
    pub fn new(data: Value) -> Self {
        Self {
            status: "ok".to_string(),
            data,
        }
    }

    /// Create a success response holding result rows
    pub fn from_rows(rows: &[Row]) -> Self {
        Self::new(Value::Array(rows.iter().map(Row::to_json).collect()))
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    /// Create from an API error
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status: "error".to_string(),
            code: err.code().code().to_string(),
            message: err.message().to_string(),
        }
    }
}

/// Unified response type
#[derive(Debug, Clone)]
pub enum Response {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl Response {
    /// Create a success response
    pub fn success(data: Value) -> Self {
        Response::Success(SuccessResponse::new(data))
    }

    /// Create a success response holding result rows
    pub fn rows(rows: &[Row]) -> Self {
        Response::Success(SuccessResponse::from_rows(rows))
    }

    /// Create an error response
    pub fn error(err: &ApiError) -> Self {
        Response::Error(ErrorResponse::from_error(err))
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            Response::Success(r) => serde_json::json!({
                "status": r.status,
                "data": r.data,
            }),
            Response::Error(r) => serde_json::json!({
                "status": r.status,
                "code": r.code,
                "message": r.message,
            }),
        }
    }

    /// Convert to a single-line JSON string
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Check if this is a success response
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }
}

impl<T> From<Result<T, ApiError>> for Response
where
    T: Into<Value>,
{
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Response::success(data.into()),
            Err(err) => Response::error(&err),
        }
    }
}
