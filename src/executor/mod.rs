//! Query Executor subsystem
//!
//! Consumes validated queries and produces deterministic rows.
//!
//! # Execution Flow (strict order)
//!
//! 1. Scan the referenced dataset through a [`RecordSource`]
//! 2. Filter records, stopping once more than [`MAX_MATCHED_RECORDS`] match
//! 3. Group and aggregate (if TRANSFORMATIONS present)
//! 4. Project to COLUMNS
//! 5. Apply ORDER (if specified)
//! 6. Return ordered rows
//!
//! Malformed records are skipped by the source and never fail a query.

mod errors;
mod executor;
mod filters;
mod projector;
mod result;
mod sorter;
mod transform;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::{QueryExecutor, RecordSource, MAX_MATCHED_RECORDS};
pub use filters::FilterEvaluator;
pub use projector::Projector;
pub use result::{ExecutionResult, Row};
pub use sorter::RowSorter;
pub use transform::{TransformationEngine, AGGREGATE_SCALE};
