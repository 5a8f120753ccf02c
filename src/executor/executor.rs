//! Query executor
//!
//! Executes validated queries against a record source.
//!
//! Execution flow (strict order):
//! 1. Scan the dataset's records in deterministic order
//! 2. Keep records matching the filter, failing once the cap is exceeded
//! 3. Group and aggregate (if TRANSFORMATIONS present)
//! 4. Project to COLUMNS
//! 5. Apply ORDER (if specified)

use std::ops::ControlFlow;

use crate::dataset::{DatasetKind, Record, ScanStats};
use crate::query::Query;

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::FilterEvaluator;
use super::projector::Projector;
use super::result::ExecutionResult;
use super::sorter::RowSorter;
use super::transform::TransformationEngine;

/// Most raw matches a query may produce. The cap applies before grouping.
pub const MAX_MATCHED_RECORDS: usize = 5000;

/// Trait for reading dataset records
pub trait RecordSource {
    /// Registered datasets and their kinds
    fn datasets(&self) -> Vec<(String, DatasetKind)>;

    /// Kind of a registered dataset
    fn dataset_kind(&self, dataset_id: &str) -> Option<DatasetKind>;

    /// Visits the dataset's valid records in a stable order until the
    /// visitor breaks. Malformed records are skipped, not returned.
    fn scan(
        &self,
        dataset_id: &str,
        visit: &mut dyn FnMut(Record) -> ControlFlow<()>,
    ) -> ExecutorResult<ScanStats>;
}

/// Query executor that evaluates queries against a record source
pub struct QueryExecutor<'a, S: RecordSource + ?Sized> {
    source: &'a S,
    max_matches: usize,
}

impl<'a, S: RecordSource + ?Sized> QueryExecutor<'a, S> {
    /// Creates a new executor with the default match cap
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            max_matches: MAX_MATCHED_RECORDS,
        }
    }

    /// Overrides the match cap
    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Executes a query and returns its rows.
    ///
    /// Deterministic: same query + same records = same rows in same order.
    pub fn execute(&self, query: &Query) -> ExecutorResult<ExecutionResult> {
        let kind = self
            .source
            .dataset_kind(&query.dataset)
            .ok_or_else(|| ExecutorError::storage_unavailable(&query.dataset, "not registered"))?;

        // Steps 1-2: scan and filter
        let mut matched = Vec::new();
        let mut too_large = false;
        let stats = self.source.scan(&query.dataset, &mut |record| {
            if !FilterEvaluator::matches(&query.filter, &record, kind) {
                return ControlFlow::Continue(());
            }
            matched.push(record);
            if matched.len() > self.max_matches {
                too_large = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })?;

        if too_large {
            return Err(ExecutorError::result_too_large(self.max_matches));
        }

        let columns = &query.options.columns;
        let matched_count = matched.len();

        // Steps 3-4: transform and project
        let mut rows = match &query.transformations {
            Some(transformations) => {
                TransformationEngine::apply(&matched, transformations, kind, columns)
            }
            None => Projector::project(&matched, columns, kind),
        };

        // Step 5: order
        if let Some(order) = &query.options.order {
            RowSorter::sort(&mut rows, order);
        }

        Ok(ExecutionResult {
            rows,
            scanned_count: stats.scanned,
            matched_count,
            skipped_count: stats.skipped,
        })
    }
}
