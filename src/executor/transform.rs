//! GROUP/APPLY evaluation
//!
//! Partitions matched records by the tuple of their GROUP field values,
//! keeping groups in first-seen order, then computes each apply rule per
//! group. SUM and AVG accumulate in decimal and round to two places.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dataset::{DatasetKind, FieldValue, Record};
use crate::query::{ApplyOp, ApplyRule, Key, Transformations};

use super::projector::Projector;
use super::result::Row;

/// Decimal places kept by SUM and AVG
pub const AGGREGATE_SCALE: u32 = 2;

/// Evaluates TRANSFORMATIONS over matched records
pub struct TransformationEngine;

impl TransformationEngine {
    /// Groups, aggregates, and projects to `columns`
    pub fn apply(
        records: &[Record],
        transformations: &Transformations,
        kind: DatasetKind,
        columns: &[String],
    ) -> Vec<Row> {
        let groups = Self::partition(records, &transformations.group, kind);

        let rows = groups
            .into_iter()
            .map(|(values, members)| {
                let mut row = Row::new();
                for (key, value) in transformations.group.iter().zip(values) {
                    row.set(key.to_string(), value);
                }
                for rule in &transformations.apply {
                    row.set(rule.name.clone(), Self::aggregate(rule, &members, kind));
                }
                row
            })
            .collect();

        Projector::select(rows, columns)
    }

    /// Groups in first-seen order. Each group carries its key tuple and
    /// its member records.
    fn partition<'r>(
        records: &'r [Record],
        group: &[Key],
        kind: DatasetKind,
    ) -> Vec<(Vec<FieldValue>, Vec<&'r Record>)> {
        let fields: Vec<&str> = group.iter().map(|k| kind.storage_name(&k.field)).collect();

        let mut index: HashMap<Vec<FieldValue>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<FieldValue>, Vec<&'r Record>)> = Vec::new();

        for record in records {
            let values: Vec<FieldValue> = fields
                .iter()
                .map(|f| {
                    record
                        .get(f)
                        .cloned()
                        .unwrap_or_else(|| FieldValue::Text(String::new()))
                })
                .collect();

            match index.get(&values) {
                Some(&i) => groups[i].1.push(record),
                None => {
                    index.insert(values.clone(), groups.len());
                    groups.push((values, vec![record]));
                }
            }
        }

        groups
    }

    fn aggregate(rule: &ApplyRule, members: &[&Record], kind: DatasetKind) -> FieldValue {
        let field = kind.storage_name(&rule.key.field);
        let values = members.iter().filter_map(|r| r.get(field));

        match rule.op {
            ApplyOp::Count => {
                let distinct: HashSet<&FieldValue> = values.collect();
                FieldValue::Number(distinct.len() as f64)
            }
            ApplyOp::Max => FieldValue::Number(
                values
                    .filter_map(FieldValue::as_f64)
                    .reduce(f64::max)
                    .unwrap_or(0.0),
            ),
            ApplyOp::Min => FieldValue::Number(
                values
                    .filter_map(FieldValue::as_f64)
                    .reduce(f64::min)
                    .unwrap_or(0.0),
            ),
            ApplyOp::Sum => {
                let numbers: Vec<f64> = values.filter_map(FieldValue::as_f64).collect();
                let sum = match decimal_sum(&numbers) {
                    Some(sum) => round(sum),
                    None => round_f64(numbers.iter().sum()),
                };
                FieldValue::Number(sum)
            }
            ApplyOp::Avg => {
                let numbers: Vec<f64> = values.filter_map(FieldValue::as_f64).collect();
                if numbers.is_empty() {
                    return FieldValue::Number(0.0);
                }
                let count = Decimal::from(numbers.len() as u64);
                let avg = match decimal_sum(&numbers).and_then(|sum| sum.checked_div(count)) {
                    Some(avg) => round(avg),
                    None => round_f64(numbers.iter().sum::<f64>() / numbers.len() as f64),
                };
                FieldValue::Number(avg)
            }
        }
    }
}

/// Exact decimal sum, or `None` when a value or the running total leaves
/// the decimal range
fn decimal_sum(numbers: &[f64]) -> Option<Decimal> {
    numbers
        .iter()
        .try_fold(Decimal::ZERO, |acc, n| acc.checked_add(to_decimal(*n)?))
}

/// Converts through the shortest decimal text of the float, so 99.19 is
/// accumulated as exactly 99.19
fn to_decimal(n: f64) -> Option<Decimal> {
    Decimal::from_str(&n.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(n))
}

/// Float rounding to two places for totals beyond the decimal range.
/// Integral values are returned unchanged.
fn round_f64(value: f64) -> f64 {
    let scaled = value * 100.0;
    if value.fract() == 0.0 || !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Rounds to two places and converts back through decimal text, so the
/// result is the float nearest the rounded decimal
fn round(value: Decimal) -> f64 {
    let rounded =
        value.round_dp_with_strategy(AGGREGATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| rounded.to_f64())
        .unwrap_or(0.0)
}
