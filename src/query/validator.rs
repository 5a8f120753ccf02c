//! Top-level query validation
//!
//! Composes the WHERE and TRANSFORMATIONS validators, checks OPTIONS, and
//! enforces that the whole query refers to exactly one dataset.
//!
//! # Validation order
//!
//! 1. Top-level shape: WHERE and OPTIONS objects, optional TRANSFORMATIONS
//! 2. TRANSFORMATIONS, collecting group and apply column names
//! 3. OPTIONS: COLUMNS, then ORDER
//! 4. WHERE (the empty object matches all)
//! 5. Single dataset across every clause

use serde_json::{Map, Value};

use crate::dataset::KeyClass;

use super::ast::{Direction, Options, Order, Query};
use super::errors::{QueryError, QueryResult};
use super::filter::{expected, DatasetRefs, FilterValidator};
use super::keys::KeyRegistry;
use super::transform::TransformationValidator;

const WHERE: &str = "WHERE";
const OPTIONS: &str = "OPTIONS";
const TRANSFORMATIONS: &str = "TRANSFORMATIONS";
const COLUMNS: &str = "COLUMNS";
const ORDER: &str = "ORDER";

/// Validates raw JSON queries and produces typed [`Query`] values
pub struct QueryValidator<'a> {
    keys: &'a KeyRegistry,
}

impl<'a> QueryValidator<'a> {
    pub fn new(keys: &'a KeyRegistry) -> Self {
        Self { keys }
    }

    pub fn is_query_valid(&self, query: &Value) -> bool {
        self.validate(query).is_ok()
    }

    /// Validates a query. The error carries the internal reason.
    pub fn validate(&self, query: &Value) -> QueryResult<Query> {
        let obj = query
            .as_object()
            .ok_or_else(|| expected("query", "object", query))?;

        if let Some(unknown) = obj
            .keys()
            .find(|k| !matches!(k.as_str(), WHERE | OPTIONS | TRANSFORMATIONS))
        {
            return Err(QueryError::invalid(format!(
                "unexpected top-level key '{}'",
                unknown
            )));
        }

        let where_node = obj
            .get(WHERE)
            .ok_or_else(|| QueryError::invalid("missing WHERE"))?;
        let options_node = obj
            .get(OPTIONS)
            .ok_or_else(|| QueryError::invalid("missing OPTIONS"))?;
        let options_obj = options_node
            .as_object()
            .ok_or_else(|| expected(OPTIONS, "object", options_node))?;
        if !where_node.is_object() {
            return Err(expected(WHERE, "object", where_node));
        }

        let mut refs = DatasetRefs::new();
        let mut group_keys = Vec::new();
        let mut apply_keys = Vec::new();

        let transformations = match obj.get(TRANSFORMATIONS) {
            Some(node) => Some(
                TransformationValidator::new(self.keys)
                    .validate(node, &mut refs, &mut group_keys, &mut apply_keys)
                    .map_err(|e| e.in_clause(TRANSFORMATIONS))?,
            ),
            None => None,
        };

        let available = transformations
            .is_some()
            .then(|| (group_keys.as_slice(), apply_keys.as_slice()));
        let options = self
            .validate_options(options_obj, available, &mut refs)
            .map_err(|e| e.in_clause(OPTIONS))?;

        let filter = FilterValidator::new(self.keys)
            .validate(where_node, &mut refs)
            .map_err(|e| e.in_clause(WHERE))?;

        let dataset = match refs.single() {
            Some(id) => id.to_string(),
            None if refs.is_empty() => {
                return Err(QueryError::invalid("query references no dataset"));
            }
            None => {
                let ids: Vec<&str> = refs.iter().collect();
                return Err(QueryError::invalid(format!(
                    "query references more than one dataset: {}",
                    ids.join(", ")
                )));
            }
        };

        Ok(Query {
            dataset,
            filter,
            transformations,
            options,
        })
    }

    /// `available` holds the group and apply names when TRANSFORMATIONS is
    /// present; columns must then come from those lists.
    fn validate_options(
        &self,
        obj: &Map<String, Value>,
        available: Option<(&[String], &[String])>,
        refs: &mut DatasetRefs,
    ) -> QueryResult<Options> {
        if let Some(unknown) = obj.keys().find(|k| !matches!(k.as_str(), COLUMNS | ORDER)) {
            return Err(QueryError::invalid(format!(
                "unexpected OPTIONS key '{}'",
                unknown
            )));
        }

        let columns_node = obj
            .get(COLUMNS)
            .ok_or_else(|| QueryError::invalid("missing COLUMNS"))?;
        let columns = string_list(COLUMNS, columns_node)?;

        for column in &columns {
            match available {
                Some((group_keys, apply_keys)) => {
                    if !group_keys.contains(column) && !apply_keys.contains(column) {
                        return Err(QueryError::invalid(format!(
                            "column '{}' is not a GROUP key or APPLY name",
                            column
                        )));
                    }
                }
                None => {
                    let key = self.keys.resolve(column, KeyClass::Any).ok_or_else(|| {
                        QueryError::invalid(format!("invalid column key '{}'", column))
                    })?;
                    refs.record(&key);
                }
            }
        }

        let order = match obj.get(ORDER) {
            Some(node) => Some(validate_order(node, &columns)?),
            None => None,
        };

        Ok(Options { columns, order })
    }
}

fn validate_order(node: &Value, columns: &[String]) -> QueryResult<Order> {
    let in_columns = |key: &String| {
        if columns.contains(key) {
            Ok(())
        } else {
            Err(QueryError::invalid(format!(
                "ORDER key '{}' is not in COLUMNS",
                key
            )))
        }
    };

    match node {
        Value::String(column) => {
            in_columns(column)?;
            Ok(Order::Column(column.clone()))
        }
        Value::Object(obj) => {
            if obj.len() != 2 || !obj.contains_key("dir") || !obj.contains_key("keys") {
                return Err(QueryError::invalid("ORDER must have exactly dir and keys"));
            }
            let dir = obj["dir"]
                .as_str()
                .and_then(Direction::from_token)
                .ok_or_else(|| QueryError::invalid("ORDER dir must be UP or DOWN"))?;
            let keys = string_list("ORDER keys", &obj["keys"])?;
            for key in &keys {
                in_columns(key)?;
            }
            Ok(Order::Keys { dir, keys })
        }
        other => Err(expected(ORDER, "string or object", other)),
    }
}

/// A non-empty array of strings
fn string_list(what: &str, node: &Value) -> QueryResult<Vec<String>> {
    let items = node.as_array().ok_or_else(|| expected(what, "array", node))?;
    if items.is_empty() {
        return Err(QueryError::invalid(format!("{} must not be empty", what)));
    }
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| expected(what, "string", item))
        })
        .collect()
}
