//! Result sorting for query execution
//!
//! Sorts rows by one or more columns. Sort is stable, so rows that compare
//! equal on every key keep their scan or group order.

use std::cmp::Ordering;

use crate::query::{Direction, Order};

use super::result::Row;

/// Sorts result rows
pub struct RowSorter;

impl RowSorter {
    /// Sorts rows according to the ORDER clause
    pub fn sort(rows: &mut [Row], order: &Order) {
        match order {
            Order::Column(column) => {
                rows.sort_by(|a, b| Self::compare_column(a, b, column));
            }
            Order::Keys { dir, keys } => {
                rows.sort_by(|a, b| {
                    let ordering = keys
                        .iter()
                        .map(|key| Self::compare_column(a, b, key))
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal);

                    match dir {
                        Direction::Up => ordering,
                        Direction::Down => ordering.reverse(),
                    }
                });
            }
        }
    }

    /// Numbers compare numerically, text lexicographically. A missing cell
    /// sorts first.
    fn compare_column(a: &Row, b: &Row, column: &str) -> Ordering {
        match (a.get(column), b.get(column)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => a_val.compare(b_val),
        }
    }
}
