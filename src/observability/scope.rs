//! ObservationScope for automatic begin/outcome logging
//!
//! - Logs a typed begin event on creation
//! - Logs a typed outcome event when ended
//! - Logs `{name}_INCOMPLETE` on drop if never ended
//!
//! Fields given at creation are repeated on every line of the scope, so a
//! correlation id ties them together.

use std::cell::Cell;
use std::time::Instant;

use super::events::Event;
use super::logger::{Logger, Severity};

/// A scope that automatically logs begin and outcome lines
///
/// ```ignore
/// let scope = ObservationScope::begin("QUERY", Event::QueryReceived, &[("query_id", &id)]);
/// // ... do work ...
/// scope.end_with(Event::QueryExecuted, &[("rows", "3")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
}

impl<'a> ObservationScope<'a> {
    /// Opens a scope and logs `event` with `fields`. Those fields appear on
    /// every later line of the scope.
    pub fn begin(name: &'a str, event: Event, fields: &[(&'a str, &str)]) -> Self {
        let scope = Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        };
        scope.emit(event.severity(), event.as_str(), &[]);
        scope
    }

    /// Ends the scope with a typed outcome event at that event's severity
    pub fn end_with(self, event: Event, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        self.emit(event.severity(), event.as_str(), extra_fields);
    }

    fn emit(&self, severity: Severity, event: &str, extra_fields: &[(&str, &str)]) {
        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.extend(extra_fields.iter().copied());
        Logger::log(severity, event, &all_fields);
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            self.emit(
                Severity::Warn,
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed microseconds as a string
    pub fn elapsed_us(&self) -> String {
        self.start.elapsed().as_micros().to_string()
    }

}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
