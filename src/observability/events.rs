//! Observable events
//!
//! Events are explicit and typed. Each carries the severity it is logged
//! at, so call sites never pick one ad hoc.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Line-delimited serving loop started
    ServeStart,
    /// Serving loop reached end of input
    ServeStop,

    // Datasets
    /// Registry loaded from the data directory
    DatasetsLoaded,
    /// Dataset registered and persisted
    DatasetAdded,
    /// Dataset removed from disk
    DatasetRemoved,
    /// Unreadable file or malformed record skipped during a scan
    RecordSkipped,

    // Queries
    /// Query received
    QueryReceived,
    /// Query executed successfully
    QueryExecuted,
    /// Query failed validation
    QueryRejected,
    /// Query matched more records than allowed
    QueryTooLarge,
    /// Query could not read its dataset
    QueryFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServeStart => "SERVE_START",
            Event::ServeStop => "SERVE_STOP",

            Event::DatasetsLoaded => "DATASETS_LOADED",
            Event::DatasetAdded => "DATASET_ADDED",
            Event::DatasetRemoved => "DATASET_REMOVED",
            Event::RecordSkipped => "RECORD_SKIPPED",

            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryTooLarge => "QUERY_TOO_LARGE",
            Event::QueryFailed => "QUERY_FAILED",
        }
    }

    /// Returns the severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RecordSkipped | Event::QueryRejected | Event::QueryTooLarge => Severity::Warn,
            Event::QueryFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Event; 12] = [
        Event::ConfigLoaded,
        Event::ServeStart,
        Event::ServeStop,
        Event::DatasetsLoaded,
        Event::DatasetAdded,
        Event::DatasetRemoved,
        Event::RecordSkipped,
        Event::QueryReceived,
        Event::QueryExecuted,
        Event::QueryRejected,
        Event::QueryTooLarge,
        Event::QueryFailed,
    ];

    #[test]
    fn test_all_events_have_string_representation() {
        for event in ALL {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severities() {
        assert_eq!(Event::RecordSkipped.severity(), Severity::Warn);
        assert_eq!(Event::QueryRejected.severity(), Severity::Warn);
        assert_eq!(Event::QueryFailed.severity(), Severity::Error);
        assert_eq!(Event::DatasetAdded.severity(), Severity::Info);
        assert!(ALL.iter().all(|e| e.severity() < Severity::Fatal));
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::QueryReceived), "QUERY_BEGIN");
        assert_eq!(format!("{}", Event::DatasetsLoaded), "DATASETS_LOADED");
    }
}
