//! Record storage: on-disk record files and an in-memory store
//!
//! On-disk layout:
//!
//! ```text
//! <data_dir>/courses/<id>/**/*.json   each file: array of section objects
//! <data_dir>/rooms/<id>/**/*.json     each file: one room object
//! ```
//!
//! Files are visited in sorted path order so repeated scans see records in
//! the same order. Unreadable files and malformed records are skipped.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::executor::{ExecutorError, ExecutorResult, RecordSource};
use crate::observability::{log_event_with_fields, Event};

use super::errors::{DatasetError, DatasetResult};
use super::kind::DatasetKind;
use super::record::Record;

/// Counters reported by a dataset scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Valid records handed to the visitor
    pub scanned: usize,
    /// Files or records that could not be read or normalized
    pub skipped: usize,
}

/// Recursively collects `.json` files under `dir`, sorted by path
pub fn collect_record_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_into(&path, files)?;
        } else if path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}

/// Parses the content of one record file.
///
/// An array yields one entry per element, anything else yields one entry.
/// Each entry is either a normalized record or the reason it was rejected.
pub fn parse_record_file(
    kind: DatasetKind,
    content: &str,
) -> Result<Vec<Result<Record, String>>, serde_json::Error> {
    let value: Value = serde_json::from_str(content)?;
    Ok(match &value {
        Value::Array(items) => items
            .iter()
            .map(|item| Record::from_stored(kind, item))
            .collect(),
        other => vec![Record::from_stored(kind, other)],
    })
}

/// Visits every valid record under `dir` until the visitor breaks.
///
/// Fails only if the directory itself cannot be listed.
pub fn scan_dir(
    kind: DatasetKind,
    dir: &Path,
    visit: &mut dyn FnMut(Record) -> ControlFlow<()>,
) -> io::Result<ScanStats> {
    let mut stats = ScanStats::default();

    for path in collect_record_files(dir)? {
        let path_str = path.display().to_string();

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                stats.skipped += 1;
                log_skipped(&path_str, 1, &e.to_string());
                continue;
            }
        };

        let entries = match parse_record_file(kind, &content) {
            Ok(entries) => entries,
            Err(e) => {
                stats.skipped += 1;
                log_skipped(&path_str, 1, &format!("invalid JSON: {}", e));
                continue;
            }
        };

        let mut malformed = 0usize;
        let mut first_reason = None;
        for entry in entries {
            match entry {
                Ok(record) => {
                    stats.scanned += 1;
                    if visit(record).is_break() {
                        return Ok(stats);
                    }
                }
                Err(reason) => {
                    malformed += 1;
                    first_reason.get_or_insert(reason);
                }
            }
        }

        if malformed > 0 {
            stats.skipped += malformed;
            log_skipped(
                &path_str,
                malformed,
                first_reason.as_deref().unwrap_or("malformed record"),
            );
        }
    }

    Ok(stats)
}

fn log_skipped(path: &str, count: usize, reason: &str) {
    log_event_with_fields(
        Event::RecordSkipped,
        &[
            ("path", path),
            ("count", &count.to_string()),
            ("reason", reason),
        ],
    );
}

/// Counts valid records under `dir`
pub fn count_records(kind: DatasetKind, dir: &Path) -> io::Result<usize> {
    let stats = scan_dir(kind, dir, &mut |_| ControlFlow::Continue(()))?;
    Ok(stats.scanned)
}

/// Writes already-extracted records into `dir`.
///
/// Courses are written as a single array file; rooms as one file per room.
/// Returns the number of records that normalize successfully.
pub fn persist_records(kind: DatasetKind, dir: &Path, records: &[Value]) -> DatasetResult<usize> {
    let valid = records
        .iter()
        .filter(|r| Record::from_stored(kind, r).is_ok())
        .count();

    fs::create_dir_all(dir).map_err(|e| DatasetError::io(dir, e))?;

    match kind {
        DatasetKind::Courses => {
            let path = dir.join("sections.json");
            let content = serde_json::to_string(records)?;
            fs::write(&path, content).map_err(|e| DatasetError::io(&path, e))?;
        }
        DatasetKind::Rooms => {
            for (i, room) in records.iter().enumerate() {
                let path = dir.join(format!("room_{:05}.json", i));
                let content = serde_json::to_string(room)?;
                fs::write(&path, content).map_err(|e| DatasetError::io(&path, e))?;
            }
        }
    }

    Ok(valid)
}

/// In-memory record store
///
/// Holds already-normalized records. Used for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: HashMap<String, (DatasetKind, Vec<Record>)>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a dataset
    pub fn insert(&mut self, id: impl Into<String>, kind: DatasetKind, records: Vec<Record>) {
        self.datasets.insert(id.into(), (kind, records));
    }

    /// Builder-style insert
    pub fn with_dataset(
        mut self,
        id: impl Into<String>,
        kind: DatasetKind,
        records: Vec<Record>,
    ) -> Self {
        self.insert(id, kind, records);
        self
    }
}

impl RecordSource for MemoryStore {
    fn datasets(&self) -> Vec<(String, DatasetKind)> {
        let mut ids: Vec<_> = self
            .datasets
            .iter()
            .map(|(id, (kind, _))| (id.clone(), *kind))
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    }

    fn dataset_kind(&self, dataset_id: &str) -> Option<DatasetKind> {
        self.datasets.get(dataset_id).map(|(kind, _)| *kind)
    }

    fn scan(
        &self,
        dataset_id: &str,
        visit: &mut dyn FnMut(Record) -> ControlFlow<()>,
    ) -> ExecutorResult<ScanStats> {
        let (_, records) = self
            .datasets
            .get(dataset_id)
            .ok_or_else(|| ExecutorError::storage_unavailable(dataset_id, "dataset not loaded"))?;

        let mut stats = ScanStats::default();
        for record in records {
            stats.scanned += 1;
            if visit(record.clone()).is_break() {
                break;
            }
        }
        Ok(stats)
    }
}
