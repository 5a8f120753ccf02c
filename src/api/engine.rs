//! Query engine facade
//!
//! Owns the record source, the key registry derived from it, and the
//! metrics counters. Queries take `&self`; dataset registration takes
//! `&mut self`, so it can never interleave with a running query.
//!
//! Query flow (strict order):
//! 1. Validate the raw JSON against the registered datasets
//! 2. Execute against the single referenced dataset
//! 3. Return ordered rows, or one error with no partial results

use std::path::Path;

use serde_json::Value;
use uuid::Uuid;

use crate::dataset::{DatasetInfo, DatasetKind, DatasetRegistry};
use crate::executor::{ExecutorErrorCode, QueryExecutor, RecordSource, Row};
use crate::observability::{Event, MetricsRegistry, ObservationScope, Timer};
use crate::query::{KeyRegistry, QueryValidator};

use super::errors::{ApiError, ApiResult};

/// Entry point for validating and running queries
pub struct QueryEngine<S: RecordSource = DatasetRegistry> {
    source: S,
    keys: KeyRegistry,
    metrics: MetricsRegistry,
}

impl<S: RecordSource> QueryEngine<S> {
    /// Creates an engine over `source`
    pub fn new(source: S) -> Self {
        let keys = KeyRegistry::from_source(&source);
        Self {
            source,
            keys,
            metrics: MetricsRegistry::new(),
        }
    }

    /// Returns the record source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the key registry used for validation
    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    /// Returns the metrics registry
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Returns true if `query` passes validation
    pub fn is_query_valid(&self, query: &Value) -> bool {
        QueryValidator::new(&self.keys).is_query_valid(query)
    }

    /// Validates and executes one query.
    ///
    /// Every validation failure surfaces as the same `CAMPUS_QUERY_INVALID`
    /// error; the reason is logged under the query's id.
    pub fn perform_query(&self, query: &Value) -> ApiResult<Vec<Row>> {
        let query_id = Uuid::new_v4().to_string();
        let timer = Timer::new();
        let scope =
            ObservationScope::begin("QUERY", Event::QueryReceived, &[("query_id", &query_id)]);

        let query = match QueryValidator::new(&self.keys).validate(query) {
            Ok(query) => query,
            Err(err) => {
                self.metrics.increment_queries_rejected();
                scope.end_with(
                    Event::QueryRejected,
                    &[
                        ("clause", err.clause().unwrap_or("QUERY")),
                        ("reason", err.message()),
                    ],
                );
                return Err(ApiError::from(err));
            }
        };

        match QueryExecutor::new(&self.source).execute(&query) {
            Ok(result) => {
                self.metrics.increment_queries_executed();
                self.metrics.add_scan(
                    result.scanned_count as u64,
                    result.matched_count as u64,
                    result.skipped_count as u64,
                );
                scope.end_with(
                    Event::QueryExecuted,
                    &[
                        ("dataset", &query.dataset),
                        ("elapsed_us", &timer.elapsed_us()),
                        ("matched", &result.matched_count.to_string()),
                        ("rows", &result.rows.len().to_string()),
                    ],
                );
                Ok(result.rows)
            }
            Err(err) => {
                let event = match err.code() {
                    ExecutorErrorCode::CampusResultTooLarge => {
                        self.metrics.increment_queries_too_large();
                        Event::QueryTooLarge
                    }
                    ExecutorErrorCode::CampusStorageUnavailable => {
                        self.metrics.increment_queries_failed();
                        Event::QueryFailed
                    }
                };
                scope.end_with(
                    event,
                    &[("dataset", &query.dataset), ("reason", err.message())],
                );
                Err(ApiError::from(err))
            }
        }
    }

    fn refresh_keys(&mut self) {
        self.keys = KeyRegistry::from_source(&self.source);
    }
}

impl QueryEngine<DatasetRegistry> {
    /// Opens the on-disk registry under `data_dir`
    pub fn open(data_dir: &Path) -> ApiResult<Self> {
        let registry = DatasetRegistry::open(data_dir)?;
        Ok(Self::new(registry))
    }

    /// Lists registered datasets in registration order
    pub fn list_datasets(&self) -> &[DatasetInfo] {
        self.source.list()
    }

    /// Registers a dataset and returns every registered id
    pub fn add_dataset(
        &mut self,
        id: &str,
        kind: DatasetKind,
        records: &[Value],
    ) -> ApiResult<Vec<String>> {
        self.source.add_dataset(id, kind, records)?;
        self.refresh_keys();
        Ok(self.source.ids().map(str::to_string).collect())
    }

    /// Removes a dataset and returns its id
    pub fn remove_dataset(&mut self, id: &str) -> ApiResult<String> {
        let removed = self.source.remove_dataset(id)?;
        self.refresh_keys();
        Ok(removed)
    }
}
