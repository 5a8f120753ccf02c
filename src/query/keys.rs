//! Key registry
//!
//! Resolves `<datasetId>_<field>` references against the registered
//! datasets and the field tables of their kinds. Built once from a
//! registry snapshot and shared by reference across validations.

use std::collections::HashMap;

use crate::dataset::{DatasetKind, KeyClass};
use crate::executor::RecordSource;

use super::ast::Key;

/// Snapshot of registered dataset ids and their kinds
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    datasets: HashMap<String, DatasetKind>,
}

impl KeyRegistry {
    pub fn new(datasets: impl IntoIterator<Item = (String, DatasetKind)>) -> Self {
        Self {
            datasets: datasets.into_iter().collect(),
        }
    }

    /// Snapshots the datasets a record source currently holds
    pub fn from_source<S: RecordSource + ?Sized>(source: &S) -> Self {
        Self::new(source.datasets())
    }

    /// Kind of a registered dataset
    pub fn kind_of(&self, dataset_id: &str) -> Option<DatasetKind> {
        self.datasets.get(dataset_id).copied()
    }

    /// Number of registered datasets
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Parses and checks a key against the requested field class
    pub fn resolve(&self, raw: &str, class: KeyClass) -> Option<Key> {
        let key = Key::parse(raw)?;
        let kind = self.kind_of(&key.dataset)?;
        let field_class = kind.field_class(&key.field)?;
        class.admits(field_class).then_some(key)
    }

    pub fn is_key_valid(&self, raw: &str, class: KeyClass) -> bool {
        self.resolve(raw, class).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KeyRegistry {
        KeyRegistry::new([
            ("courses".to_string(), DatasetKind::Courses),
            ("rooms".to_string(), DatasetKind::Rooms),
        ])
    }

    #[test]
    fn test_field_class_must_match() {
        let keys = registry();
        assert!(keys.is_key_valid("courses_dept", KeyClass::String));
        assert!(!keys.is_key_valid("courses_dept", KeyClass::Numeric));
        assert!(keys.is_key_valid("courses_avg", KeyClass::Numeric));
        assert!(!keys.is_key_valid("courses_avg", KeyClass::String));
        assert!(keys.is_key_valid("courses_avg", KeyClass::Any));
        assert!(keys.is_key_valid("rooms_seats", KeyClass::Numeric));
    }

    #[test]
    fn test_every_declared_field_resolves() {
        let keys = registry();
        for (id, kind) in [("courses", DatasetKind::Courses), ("rooms", DatasetKind::Rooms)] {
            for (storage, class) in kind.storage_fields() {
                let field = kind.external_name(storage);
                let raw = format!("{}_{}", id, field);
                let expected = match class {
                    crate::dataset::FieldClass::String => KeyClass::String,
                    crate::dataset::FieldClass::Numeric => KeyClass::Numeric,
                };
                assert!(keys.is_key_valid(&raw, expected), "{}", raw);
                assert!(keys.is_key_valid(&raw, KeyClass::Any), "{}", raw);
            }
        }
    }

    #[test]
    fn test_unregistered_dataset_rejected() {
        let keys = registry();
        assert!(!keys.is_key_valid("other_avg", KeyClass::Any));
    }

    #[test]
    fn test_field_of_other_kind_rejected() {
        let keys = registry();
        assert!(!keys.is_key_valid("courses_seats", KeyClass::Any));
        assert!(!keys.is_key_valid("rooms_avg", KeyClass::Any));
    }

    #[test]
    fn test_malformed_keys_rejected() {
        let keys = registry();
        for raw in ["courses", "courses_avg_x", "_avg", "courses_", ""] {
            assert!(!keys.is_key_valid(raw, KeyClass::Any), "{}", raw);
        }
    }

    #[test]
    fn test_resolve_returns_parts() {
        let key = registry().resolve("rooms_shortname", KeyClass::String).unwrap();
        assert_eq!(key, Key::new("rooms", "shortname"));
    }
}
