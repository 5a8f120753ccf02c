//! Filter evaluation for query execution
//!
//! Evaluates a validated filter tree against one record. Field names are
//! translated to storage names for the dataset kind. A missing field, or a
//! field of the wrong type, never matches.

use crate::dataset::{DatasetKind, FieldValue, Record};
use crate::query::{Filter, Key};

/// Evaluates filters against records
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Checks if a record matches the filter
    pub fn matches(filter: &Filter, record: &Record, kind: DatasetKind) -> bool {
        match filter {
            Filter::MatchAll => true,
            Filter::And(children) => children.iter().all(|c| Self::matches(c, record, kind)),
            Filter::Or(children) => children.iter().any(|c| Self::matches(c, record, kind)),
            Filter::Not(child) => !Self::matches(child, record, kind),
            Filter::Compare { op, key, value } => Self::field(record, kind, key)
                .and_then(|v| v.as_f64())
                .map_or(false, |actual| op.compare(actual, *value)),
            Filter::Is { key, pattern } => Self::field(record, kind, key)
                .and_then(|v| v.as_str())
                .map_or(false, |actual| pattern.matches(actual)),
        }
    }

    fn field<'r>(record: &'r Record, kind: DatasetKind, key: &Key) -> Option<&'r FieldValue> {
        record.get(kind.storage_name(&key.field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{NumOp, Pattern};

    fn section(dept: &str, avg: f64) -> Record {
        Record::new().with("Subject", dept).with("Avg", avg)
    }

    fn gt(field: &str, value: f64) -> Filter {
        Filter::Compare {
            op: NumOp::Gt,
            key: Key::new("courses", field),
            value,
        }
    }

    fn is(field: &str, pattern: &str) -> Filter {
        Filter::Is {
            key: Key::new("courses", field),
            pattern: Pattern::parse(pattern).unwrap(),
        }
    }

    #[test]
    fn test_external_names_are_translated() {
        let record = section("cpsc", 95.0);
        assert!(FilterEvaluator::matches(&gt("avg", 90.0), &record, DatasetKind::Courses));
        assert!(FilterEvaluator::matches(&is("dept", "cp*"), &record, DatasetKind::Courses));
    }

    #[test]
    fn test_logical_operators() {
        let record = section("cpsc", 95.0);
        let kind = DatasetKind::Courses;

        let both = Filter::And(vec![gt("avg", 90.0), is("dept", "math")]);
        assert!(!FilterEvaluator::matches(&both, &record, kind));

        let either = Filter::Or(vec![gt("avg", 99.0), is("dept", "*psc")]);
        assert!(FilterEvaluator::matches(&either, &record, kind));

        let negated = Filter::Not(Box::new(is("dept", "cpsc")));
        assert!(!FilterEvaluator::matches(&negated, &record, kind));

        assert!(FilterEvaluator::matches(&Filter::MatchAll, &record, kind));
    }

    #[test]
    fn test_numeric_not_string_comparison() {
        let record = section("cpsc", 9.0);
        assert!(!FilterEvaluator::matches(&gt("avg", 10.0), &record, DatasetKind::Courses));
        assert!(FilterEvaluator::matches(&gt("avg", 8.5), &record, DatasetKind::Courses));
    }

    #[test]
    fn test_missing_or_mistyped_field_never_matches() {
        let record = Record::new().with("Subject", "cpsc").with("Avg", "high");
        let kind = DatasetKind::Courses;
        assert!(!FilterEvaluator::matches(&gt("avg", 0.0), &record, kind));
        assert!(!FilterEvaluator::matches(&is("title", "*"), &record, kind));
        assert!(FilterEvaluator::matches(&Filter::Not(Box::new(gt("avg", 0.0))), &record, kind));
    }
}
