//! Result types for query execution

use serde_json::{Map, Value};

use crate::dataset::FieldValue;

/// One output row: named cells in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, FieldValue)>,
}

impl Row {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell, overwriting an existing cell of the same name in place
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.cells.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((name, value)),
        }
    }

    /// Builder-style set
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Gets a cell by column name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(n, _)| n.as_str())
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Converts to a JSON object with keys in column order
    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.cells.len());
        for (name, value) in &self.cells {
            obj.insert(name.clone(), value.to_json());
        }
        Value::Object(obj)
    }
}

/// Result of query execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Rows in result order
    pub rows: Vec<Row>,
    /// Valid records visited
    pub scanned_count: usize,
    /// Records that passed the filter
    pub matched_count: usize,
    /// Files or records skipped as unreadable or malformed
    pub skipped_count: usize,
}

impl ExecutionResult {
    /// Rows as a JSON array
    pub fn to_json(&self) -> Value {
        Value::Array(self.rows.iter().map(Row::to_json).collect())
    }
}
