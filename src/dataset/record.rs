//! Record and field value types
//!
//! A record is a flat map from storage field name to a string or number.
//! Stored JSON is normalized into records on read; anything that cannot be
//! normalized is reported as malformed and skipped by the caller.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use super::kind::{DatasetKind, FieldClass};

/// Year assigned to "overall" course sections
pub const OVERALL_SECTION_YEAR: f64 = 1900.0;

/// A single field value
#[derive(Debug, Clone)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Returns the numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Returns the string value, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Converts to JSON. Integral numbers are emitted as JSON integers.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => number_to_json(*n),
        }
    }

    /// Total ordering used by the sorter: numbers before text, numbers
    /// numerically, text lexicographically.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }

    /// Bit pattern with -0.0 folded into 0.0, so Eq and Hash agree
    fn number_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                Self::number_bits(*a) == Self::number_bits(*b)
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            FieldValue::Number(n) => {
                0u8.hash(state);
                Self::number_bits(*n).hash(state);
            }
            FieldValue::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub(crate) fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// A normalized record keyed by storage field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Gets a field by storage name
    pub fn get(&self, storage_field: &str) -> Option<&FieldValue> {
        self.values.get(storage_field)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Normalizes a stored JSON object into a record of the given kind.
    ///
    /// Only the kind's storage fields are kept. Every one of them must be
    /// present and coercible to its class.
    pub fn from_stored(kind: DatasetKind, stored: &Value) -> Result<Self, String> {
        let obj = stored
            .as_object()
            .ok_or_else(|| format!("expected object, found {}", json_type_name(stored)))?;

        let mut record = Record::new();
        for (field, class) in kind.storage_fields() {
            let raw = obj
                .get(field)
                .ok_or_else(|| format!("missing field '{}'", field))?;
            let value = match class {
                FieldClass::Numeric => coerce_number(raw),
                FieldClass::String => coerce_text(raw),
            }
            .ok_or_else(|| {
                format!(
                    "field '{}' has unusable {} value",
                    field,
                    json_type_name(raw)
                )
            })?;
            record.insert(field, value);
        }

        if kind == DatasetKind::Courses
            && obj.get("Section").and_then(Value::as_str) == Some("overall")
        {
            record.insert("Year", OVERALL_SECTION_YEAR);
        }

        Ok(record)
    }
}

fn coerce_number(raw: &Value) -> Option<FieldValue> {
    match raw {
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        // `parse` also accepts "NaN" and "inf"; those are not usable numbers
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FieldValue::Number),
        _ => None,
    }
}

fn coerce_text(raw: &Value) -> Option<FieldValue> {
    match raw {
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => Some(FieldValue::Text(n.to_string())),
        _ => None,
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
