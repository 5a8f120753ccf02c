//! Dataset kinds and their field tables
//!
//! Each kind declares two disjoint field sets:
//! - S-fields: string-valued, usable with IS
//! - M-fields: numeric-valued, usable with EQ/GT/LT and numeric aggregates
//!
//! Queries use external field names ("dept"). Stored records use storage
//! names ("Subject"). The mapping is fixed per kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of records a dataset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Course sections
    Courses,
    /// Room listings
    Rooms,
}

/// Class of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// S-field
    String,
    /// M-field
    Numeric,
}

/// Field class requested when validating a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// S-fields only
    String,
    /// M-fields only
    Numeric,
    /// Either set
    Any,
}

impl KeyClass {
    /// Returns true if a field of class `field` satisfies this key class
    pub fn admits(&self, field: FieldClass) -> bool {
        match self {
            KeyClass::String => field == FieldClass::String,
            KeyClass::Numeric => field == FieldClass::Numeric,
            KeyClass::Any => true,
        }
    }
}

/// (external name, storage name)
const COURSE_S_FIELDS: &[(&str, &str)] = &[
    ("dept", "Subject"),
    ("id", "Course"),
    ("instructor", "Professor"),
    ("title", "Title"),
    ("uuid", "id"),
];

const COURSE_M_FIELDS: &[(&str, &str)] = &[
    ("avg", "Avg"),
    ("pass", "Pass"),
    ("fail", "Fail"),
    ("audit", "Audit"),
    ("year", "Year"),
];

const ROOM_S_FIELDS: &[(&str, &str)] = &[
    ("fullname", "fullname"),
    ("shortname", "shortname"),
    ("number", "number"),
    ("name", "name"),
    ("address", "address"),
    ("type", "type"),
    ("furniture", "furniture"),
    ("href", "href"),
];

const ROOM_M_FIELDS: &[(&str, &str)] = &[("lat", "lat"), ("lon", "lon"), ("seats", "seats")];

impl DatasetKind {
    /// All kinds, in directory scan order
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Courses, DatasetKind::Rooms];

    /// Returns the lowercase name, also used as the on-disk directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Courses => "courses",
            DatasetKind::Rooms => "rooms",
        }
    }

    fn s_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DatasetKind::Courses => COURSE_S_FIELDS,
            DatasetKind::Rooms => ROOM_S_FIELDS,
        }
    }

    fn m_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DatasetKind::Courses => COURSE_M_FIELDS,
            DatasetKind::Rooms => ROOM_M_FIELDS,
        }
    }

    /// Returns the class of an external field name, or None if the kind
    /// has no such field
    pub fn field_class(&self, field: &str) -> Option<FieldClass> {
        if self.s_fields().iter().any(|(name, _)| *name == field) {
            Some(FieldClass::String)
        } else if self.m_fields().iter().any(|(name, _)| *name == field) {
            Some(FieldClass::Numeric)
        } else {
            None
        }
    }

    /// Translates an external field name to its storage name.
    ///
    /// Unknown names are returned unchanged.
    pub fn storage_name<'a>(&self, field: &'a str) -> &'a str {
        self.s_fields()
            .iter()
            .chain(self.m_fields())
            .find(|(name, _)| *name == field)
            .map(|(_, storage)| *storage)
            .unwrap_or(field)
    }

    /// Translates a storage name back to its external field name
    pub fn external_name<'a>(&self, storage: &'a str) -> &'a str {
        self.s_fields()
            .iter()
            .chain(self.m_fields())
            .find(|(_, stored)| *stored == storage)
            .map(|(name, _)| *name)
            .unwrap_or(storage)
    }

    /// Iterates (storage name, class) for every field of this kind
    pub fn storage_fields(&self) -> impl Iterator<Item = (&'static str, FieldClass)> {
        let strings = self
            .s_fields()
            .iter()
            .map(|(_, storage)| (*storage, FieldClass::String));
        let numbers = self
            .m_fields()
            .iter()
            .map(|(_, storage)| (*storage, FieldClass::Numeric));
        strings.chain(numbers)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "courses" => Ok(DatasetKind::Courses),
            "rooms" => Ok(DatasetKind::Rooms),
            other => Err(format!("unknown dataset kind '{}'", other)),
        }
    }
}
