//! Registry of datasets persisted under the data directory
//!
//! The registry is rebuilt from disk at startup by listing
//! `<data_dir>/<kind>/<id>` directories. It is the disk-backed record
//! source for the executor.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::{ExecutorError, ExecutorResult, RecordSource};
use crate::observability::{log_event_with_fields, Event};

use super::errors::{DatasetError, DatasetResult};
use super::kind::DatasetKind;
use super::record::Record;
use super::store::{count_records, persist_records, scan_dir, ScanStats};

/// Character reserved as the key separator
pub const KEY_SEPARATOR: char = '_';

/// Summary of a registered dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub kind: DatasetKind,
    #[serde(rename = "numRows")]
    pub num_rows: usize,
}

/// Disk-backed dataset registry
#[derive(Debug)]
pub struct DatasetRegistry {
    data_dir: PathBuf,
    datasets: Vec<DatasetInfo>,
}

impl DatasetRegistry {
    /// Opens the registry rooted at `data_dir`, creating the kind
    /// directories if needed and loading every dataset found.
    pub fn open(data_dir: &Path) -> DatasetResult<Self> {
        let mut registry = Self {
            data_dir: data_dir.to_path_buf(),
            datasets: Vec::new(),
        };

        for kind in DatasetKind::ALL {
            let kind_dir = registry.kind_dir(kind);
            fs::create_dir_all(&kind_dir).map_err(|e| DatasetError::io(&kind_dir, e))?;
            registry.load_kind(kind)?;
        }

        log_event_with_fields(
            Event::DatasetsLoaded,
            &[
                ("count", &registry.datasets.len().to_string()),
                ("data_dir", &data_dir.display().to_string()),
            ],
        );

        Ok(registry)
    }

    fn load_kind(&mut self, kind: DatasetKind) -> DatasetResult<()> {
        let kind_dir = self.kind_dir(kind);
        let entries = fs::read_dir(&kind_dir).map_err(|e| DatasetError::io(&kind_dir, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| DatasetError::io(&kind_dir, e))?.path();
            if !path.is_dir() {
                continue;
            }
            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => ids.push(name.to_string()),
                None => skip_dir(&path, "directory name is not UTF-8"),
            }
        }
        ids.sort();

        for id in ids {
            if Self::validate_id(&id).is_err() {
                skip_dir(&self.dataset_dir(kind, &id), "invalid dataset id");
                continue;
            }
            if self.get(&id).is_some() {
                skip_dir(&self.dataset_dir(kind, &id), "dataset id already registered");
                continue;
            }
            let dir = self.dataset_dir(kind, &id);
            let num_rows = count_records(kind, &dir).map_err(|e| DatasetError::io(&dir, e))?;
            self.datasets.push(DatasetInfo { id, kind, num_rows });
        }

        Ok(())
    }

    /// Root data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn kind_dir(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.as_str())
    }

    /// Directory holding a dataset's record files
    pub fn dataset_dir(&self, kind: DatasetKind, id: &str) -> PathBuf {
        self.kind_dir(kind).join(id)
    }

    /// All registered datasets
    pub fn list(&self) -> &[DatasetInfo] {
        &self.datasets
    }

    /// Ids of all registered datasets
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.id.as_str())
    }

    /// Looks up a dataset by id
    pub fn get(&self, id: &str) -> Option<&DatasetInfo> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Checks the id rule: non-empty, not whitespace-only, no '_', and a
    /// single plain path component (no separators, `.`, `..` or roots)
    pub fn validate_id(id: &str) -> DatasetResult<()> {
        let invalid = || DatasetError::InvalidId(id.to_string());
        if id.trim().is_empty() || id.contains(KEY_SEPARATOR) {
            return Err(invalid());
        }
        if id.contains('/') || id.contains('\\') {
            return Err(invalid());
        }
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == id => Ok(()),
            _ => Err(invalid()),
        }
    }

    /// Dataset directory for a write or delete. It must sit directly under
    /// the kind directory.
    fn owned_dataset_dir(&self, kind: DatasetKind, id: &str) -> DatasetResult<PathBuf> {
        let dir = self.dataset_dir(kind, id);
        if dir.parent() != Some(self.kind_dir(kind).as_path()) {
            return Err(DatasetError::InvalidId(id.to_string()));
        }
        Ok(dir)
    }

    /// Registers a dataset from already-extracted records using storage
    /// field names, persisting them under the data directory.
    pub fn add_dataset(
        &mut self,
        id: &str,
        kind: DatasetKind,
        records: &[Value],
    ) -> DatasetResult<&DatasetInfo> {
        Self::validate_id(id)?;
        if self.get(id).is_some() {
            return Err(DatasetError::DuplicateId(id.to_string()));
        }
        if !records.iter().any(|r| Record::from_stored(kind, r).is_ok()) {
            return Err(DatasetError::NoValidRecords(id.to_string()));
        }

        let dir = self.owned_dataset_dir(kind, id)?;
        let num_rows = match persist_records(kind, &dir, records) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_dir_all(&dir);
                return Err(e);
            }
        };

        log_event_with_fields(
            Event::DatasetAdded,
            &[
                ("id", id),
                ("kind", kind.as_str()),
                ("rows", &num_rows.to_string()),
            ],
        );

        self.datasets.push(DatasetInfo {
            id: id.to_string(),
            kind,
            num_rows,
        });
        let index = self.datasets.len() - 1;
        Ok(&self.datasets[index])
    }

    /// Removes a dataset and deletes its files. Returns the removed id.
    pub fn remove_dataset(&mut self, id: &str) -> DatasetResult<String> {
        Self::validate_id(id)?;
        let index = self
            .datasets
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| DatasetError::NotFound(id.to_string()))?;

        let dir = self.owned_dataset_dir(self.datasets[index].kind, id)?;
        let info = self.datasets.remove(index);
        fs::remove_dir_all(&dir).map_err(|e| DatasetError::io(&dir, e))?;

        log_event_with_fields(
            Event::DatasetRemoved,
            &[("id", id), ("kind", info.kind.as_str())],
        );

        Ok(info.id)
    }
}

fn skip_dir(path: &Path, reason: &str) {
    log_event_with_fields(
        Event::RecordSkipped,
        &[("path", &path.display().to_string()), ("reason", reason)],
    );
}

impl RecordSource for DatasetRegistry {
    fn datasets(&self) -> Vec<(String, DatasetKind)> {
        self.datasets
            .iter()
            .map(|d| (d.id.clone(), d.kind))
            .collect()
    }

    fn dataset_kind(&self, dataset_id: &str) -> Option<DatasetKind> {
        self.get(dataset_id).map(|d| d.kind)
    }

    fn scan(
        &self,
        dataset_id: &str,
        visit: &mut dyn FnMut(Record) -> ControlFlow<()>,
    ) -> ExecutorResult<ScanStats> {
        let kind = self
            .dataset_kind(dataset_id)
            .ok_or_else(|| ExecutorError::storage_unavailable(dataset_id, "dataset not registered"))?;
        let dir = self.dataset_dir(kind, dataset_id);
        scan_dir(kind, &dir, visit)
            .map_err(|e| ExecutorError::storage_unavailable(dataset_id, e.to_string()))
    }
}
