//! TRANSFORMATIONS clause validation
//!
//! Checks GROUP and APPLY and collects the column names they make
//! available to OPTIONS: group keys as written, apply rule names.

use serde_json::Value;

use crate::dataset::KeyClass;

use super::ast::{ApplyOp, ApplyRule, Key, Transformations};
use super::errors::{QueryError, QueryResult};
use super::filter::{expected, single_entry, DatasetRefs};
use super::keys::KeyRegistry;

const GROUP: &str = "GROUP";
const APPLY: &str = "APPLY";

/// Validates TRANSFORMATIONS against a key registry
pub struct TransformationValidator<'a> {
    keys: &'a KeyRegistry,
}

impl<'a> TransformationValidator<'a> {
    pub fn new(keys: &'a KeyRegistry) -> Self {
        Self { keys }
    }

    /// Validates the clause, recording referenced datasets in `refs`,
    /// group key names in `group_keys` and apply names in `apply_keys`.
    pub fn validate(
        &self,
        node: &Value,
        refs: &mut DatasetRefs,
        group_keys: &mut Vec<String>,
        apply_keys: &mut Vec<String>,
    ) -> QueryResult<Transformations> {
        let obj = node
            .as_object()
            .ok_or_else(|| expected("TRANSFORMATIONS", "object", node))?;
        if obj.len() != 2 || !obj.contains_key(GROUP) || !obj.contains_key(APPLY) {
            return Err(QueryError::invalid(
                "TRANSFORMATIONS must have exactly GROUP and APPLY",
            ));
        }

        let group = self.validate_group(&obj[GROUP], refs, group_keys)?;
        let apply = self.validate_apply(&obj[APPLY], refs, apply_keys)?;

        Ok(Transformations { group, apply })
    }

    pub fn is_transformations_valid(&self, node: &Value) -> bool {
        self.validate(node, &mut DatasetRefs::new(), &mut Vec::new(), &mut Vec::new())
            .is_ok()
    }

    fn validate_group(
        &self,
        node: &Value,
        refs: &mut DatasetRefs,
        group_keys: &mut Vec<String>,
    ) -> QueryResult<Vec<Key>> {
        let items = node.as_array().ok_or_else(|| expected(GROUP, "array", node))?;
        if items.is_empty() {
            return Err(QueryError::invalid("GROUP must not be empty"));
        }

        let mut group = Vec::with_capacity(items.len());
        for item in items {
            let raw = item.as_str().ok_or_else(|| expected(GROUP, "string", item))?;
            let key = self.resolve(raw, KeyClass::Any, GROUP)?;
            refs.record(&key);
            if !group_keys.iter().any(|k| k == raw) {
                group_keys.push(raw.to_string());
                group.push(key);
            }
        }
        Ok(group)
    }

    fn validate_apply(
        &self,
        node: &Value,
        refs: &mut DatasetRefs,
        apply_keys: &mut Vec<String>,
    ) -> QueryResult<Vec<ApplyRule>> {
        let items = node.as_array().ok_or_else(|| expected(APPLY, "array", node))?;

        let mut rules = Vec::with_capacity(items.len());
        for item in items {
            let rule = item.as_object().ok_or_else(|| expected(APPLY, "object", item))?;
            let (name, body) = single_entry(rule, "apply rule")?;
            let body = body
                .as_object()
                .ok_or_else(|| expected("apply rule", "object", body))?;
            let (token, raw_key) = single_entry(body, name)?;

            let op = ApplyOp::from_token(token).ok_or_else(|| {
                QueryError::invalid(format!("unknown apply operator '{}'", token))
            })?;
            let raw_key = raw_key
                .as_str()
                .ok_or_else(|| expected(op.as_str(), "string", raw_key))?;
            let class = if op.requires_numeric() {
                KeyClass::Numeric
            } else {
                KeyClass::Any
            };
            let key = self.resolve(raw_key, class, op.as_str())?;

            refs.record(&key);
            apply_keys.push(name.clone());
            rules.push(ApplyRule {
                name: name.clone(),
                op,
                key,
            });
        }
        Ok(rules)
    }

    fn resolve(&self, raw: &str, class: KeyClass, op: &str) -> QueryResult<Key> {
        self.keys
            .resolve(raw, class)
            .ok_or_else(|| QueryError::invalid(format!("invalid key '{}' in {}", raw, op)))
    }
}
