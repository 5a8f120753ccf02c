//! Observability subsystem
//!
//! This module provides:
//! - Structured logging (JSON lines on stderr)
//! - Atomic counters for query outcomes and scan volume
//! - Typed lifecycle and query events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use campusdb::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};
//!
//! log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "./data")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//!
//! let scope = ObservationScope::begin("QUERY", Event::QueryReceived, &[("query_id", "q1")]);
//! // ... do work ...
//! scope.end_with(Event::QueryExecuted, &[("rows", "0")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log an event at its own severity with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
        log_event_with_fields(
            Event::RecordSkipped,
            &[("path", "/tmp/x.json"), ("reason", "invalid JSON")],
        );
    }
}
