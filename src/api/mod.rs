//! API layer for campusdb
//!
//! The API layer is the single entry point for queries and dataset
//! management. It maps subsystem errors onto the external error codes.
//!
//! # Design Principles
//!
//! - Every invalid query yields the same `CAMPUS_QUERY_INVALID` error
//! - No partial results
//! - Registration and queries are serialized by `&mut self` / `&self`
//!
//! # Supported Operations
//!
//! - perform_query
//! - list_datasets
//! - add_dataset
//! - remove_dataset

mod engine;
mod errors;
mod response;

pub use engine::QueryEngine;
pub use errors::{ApiError, ApiErrorCode, ApiResult, Severity};
pub use response::{ErrorResponse, Response, SuccessResponse};
