//! Column projection
//!
//! Narrows records or synthesized rows to the requested COLUMNS, in the
//! order they were requested. A column listed twice appears once, at its
//! first position.

use crate::dataset::{DatasetKind, Record, KEY_SEPARATOR};

use super::result::Row;

/// Builds output rows from records or synthesized rows
pub struct Projector;

impl Projector {
    /// Projects matched records. Each column is a key whose field is
    /// translated to its storage name.
    pub fn project(records: &[Record], columns: &[String], kind: DatasetKind) -> Vec<Row> {
        let fields: Vec<(&str, &str)> = Self::unique(columns)
            .into_iter()
            .map(|column| {
                let field = column
                    .split_once(KEY_SEPARATOR)
                    .map_or(column, |(_, field)| kind.storage_name(field));
                (column, field)
            })
            .collect();

        records
            .iter()
            .map(|record| {
                let mut row = Row::new();
                for (column, field) in &fields {
                    if let Some(value) = record.get(field) {
                        row.set(*column, value.clone());
                    }
                }
                row
            })
            .collect()
    }

    /// Narrows synthesized rows to the requested columns
    pub fn select(rows: Vec<Row>, columns: &[String]) -> Vec<Row> {
        let columns = Self::unique(columns);
        rows.into_iter()
            .map(|row| {
                let mut projected = Row::new();
                for column in &columns {
                    if let Some(value) = row.get(column) {
                        projected.set(*column, value.clone());
                    }
                }
                projected
            })
            .collect()
    }

    fn unique(columns: &[String]) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());
        for column in columns {
            if !seen.contains(&column.as_str()) {
                seen.push(column);
            }
        }
        seen
    }
}
