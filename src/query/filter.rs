//! WHERE clause validation
//!
//! Walks the raw filter tree, checks its shape and operand types, and
//! builds the typed [`Filter`]. Every dataset id a key refers to is
//! recorded in the caller's [`DatasetRefs`] so the query validator can
//! enforce the single-dataset rule across clauses.

use serde_json::{Map, Value};

use crate::dataset::{json_type_name, KeyClass};

use super::ast::{Filter, Key, NumOp, Pattern};
use super::errors::{QueryError, QueryResult};
use super::keys::KeyRegistry;

/// Distinct dataset ids referenced so far, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetRefs {
    ids: Vec<String>,
}

impl DatasetRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &Key) {
        if !self.ids.iter().any(|id| *id == key.dataset) {
            self.ids.push(key.dataset.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The dataset id, if exactly one was referenced
    pub fn single(&self) -> Option<&str> {
        match self.ids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Validates WHERE trees against a key registry
pub struct FilterValidator<'a> {
    keys: &'a KeyRegistry,
}

impl<'a> FilterValidator<'a> {
    pub fn new(keys: &'a KeyRegistry) -> Self {
        Self { keys }
    }

    /// Validates a top-level WHERE value. The empty object matches all.
    pub fn validate(&self, node: &Value, refs: &mut DatasetRefs) -> QueryResult<Filter> {
        let obj = node
            .as_object()
            .ok_or_else(|| expected("WHERE", "object", node))?;
        if obj.is_empty() {
            return Ok(Filter::MatchAll);
        }
        self.validate_node(obj, refs)
    }

    pub fn is_filter_valid(&self, node: &Value) -> bool {
        self.validate(node, &mut DatasetRefs::new()).is_ok()
    }

    /// A non-root node: exactly one operator key
    fn validate_node(&self, obj: &Map<String, Value>, refs: &mut DatasetRefs) -> QueryResult<Filter> {
        let (op, body) = single_entry(obj, "filter")?;

        match op.as_str() {
            "AND" => Ok(Filter::And(self.validate_children(op, body, refs)?)),
            "OR" => Ok(Filter::Or(self.validate_children(op, body, refs)?)),
            "NOT" => {
                let child = body.as_object().ok_or_else(|| expected("NOT", "object", body))?;
                Ok(Filter::Not(Box::new(self.validate_node(child, refs)?)))
            }
            "IS" => self.validate_is(body, refs),
            token => match NumOp::from_token(token) {
                Some(num_op) => self.validate_compare(num_op, body, refs),
                None => Err(QueryError::invalid(format!(
                    "unknown filter operator '{}'",
                    token
                ))),
            },
        }
    }

    fn validate_children(
        &self,
        op: &str,
        body: &Value,
        refs: &mut DatasetRefs,
    ) -> QueryResult<Vec<Filter>> {
        let items = body.as_array().ok_or_else(|| expected(op, "array", body))?;
        if items.is_empty() {
            return Err(QueryError::invalid(format!("{} must not be empty", op)));
        }

        items
            .iter()
            .map(|item| {
                let child = item.as_object().ok_or_else(|| expected(op, "object", item))?;
                self.validate_node(child, refs)
            })
            .collect()
    }

    fn validate_is(&self, body: &Value, refs: &mut DatasetRefs) -> QueryResult<Filter> {
        let obj = body.as_object().ok_or_else(|| expected("IS", "object", body))?;
        let (raw_key, raw_pattern) = single_entry(obj, "IS")?;

        let key = self.resolve(raw_key, KeyClass::String, "IS")?;
        let text = raw_pattern
            .as_str()
            .ok_or_else(|| expected("IS", "string", raw_pattern))?;
        let pattern = Pattern::parse(text)
            .ok_or_else(|| QueryError::invalid(format!("invalid wildcard pattern '{}'", text)))?;

        refs.record(&key);
        Ok(Filter::Is { key, pattern })
    }

    fn validate_compare(
        &self,
        op: NumOp,
        body: &Value,
        refs: &mut DatasetRefs,
    ) -> QueryResult<Filter> {
        let obj = body
            .as_object()
            .ok_or_else(|| expected(op.as_str(), "object", body))?;
        let (raw_key, raw_value) = single_entry(obj, op.as_str())?;

        let key = self.resolve(raw_key, KeyClass::Numeric, op.as_str())?;
        let value = raw_value
            .as_f64()
            .ok_or_else(|| expected(op.as_str(), "number", raw_value))?;

        refs.record(&key);
        Ok(Filter::Compare { op, key, value })
    }

    fn resolve(&self, raw: &str, class: KeyClass, op: &str) -> QueryResult<Key> {
        self.keys
            .resolve(raw, class)
            .ok_or_else(|| QueryError::invalid(format!("invalid key '{}' in {}", raw, op)))
    }
}

/// The only entry of an object that must hold exactly one key
pub(crate) fn single_entry<'v>(
    obj: &'v Map<String, Value>,
    what: &str,
) -> QueryResult<(&'v String, &'v Value)> {
    let mut entries = obj.iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(QueryError::invalid(format!(
            "{} must have exactly one key, found {}",
            what,
            obj.len()
        ))),
    }
}

pub(crate) fn expected(what: &str, type_name: &str, found: &Value) -> QueryError {
    QueryError::invalid(format!(
        "{} expects {}, found {}",
        what,
        type_name,
        json_type_name(found)
    ))
}
