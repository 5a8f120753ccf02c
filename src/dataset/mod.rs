//! Dataset subsystem
//!
//! Owns the dataset kinds and their field tables, record normalization,
//! on-disk record files, and the registry of datasets under the data
//! directory.
//!
//! # On-disk layout
//!
//! ```text
//! <data_dir>/courses/<id>/...json
//! <data_dir>/rooms/<id>/...json
//! ```
//!
//! Datasets are read-only while queries run. Registration and removal go
//! through [`DatasetRegistry`].

mod errors;
mod kind;
mod record;
mod registry;
mod store;

pub use errors::{DatasetError, DatasetResult};
pub use kind::{DatasetKind, FieldClass, KeyClass};
pub use record::{FieldValue, Record, OVERALL_SECTION_YEAR};
pub use registry::{DatasetInfo, DatasetRegistry, KEY_SEPARATOR};
pub use store::{
    collect_record_files, count_records, parse_record_file, persist_records, scan_dir,
    MemoryStore, ScanStats,
};

pub(crate) use record::json_type_name;
