//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing the query engine's counters
///
/// # Thread Safety
///
/// All counters use atomic operations with Relaxed ordering.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Queries that returned rows
    queries_executed: AtomicU64,
    /// Queries that failed validation
    queries_rejected: AtomicU64,
    /// Queries that exceeded the match cap
    queries_too_large: AtomicU64,
    /// Queries that failed reading storage
    queries_failed: AtomicU64,
    /// Valid records visited by scans
    records_scanned: AtomicU64,
    /// Records that passed a filter
    records_matched: AtomicU64,
    /// Files or records skipped as malformed
    records_skipped: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Query outcomes

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_too_large(&self) {
        self.queries_too_large.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Scan volume

    /// Adds the counters of one completed scan
    pub fn add_scan(&self, scanned: u64, matched: u64, skipped: u64) {
        self.records_scanned.fetch_add(scanned, Ordering::Relaxed);
        self.records_matched.fetch_add(matched, Ordering::Relaxed);
        self.records_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"queries_executed":{},"queries_rejected":{},"queries_too_large":{},"queries_failed":{},"records_scanned":{},"records_matched":{},"records_skipped":{}}}"#,
            s.queries_executed,
            s.queries_rejected,
            s.queries_too_large,
            s.queries_failed,
            s.records_scanned,
            s.records_matched,
            s.records_skipped,
        )
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            queries_too_large: self.queries_too_large.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            records_scanned: self.records_scanned.load(Ordering::Relaxed),
            records_matched: self.records_matched.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub queries_too_large: u64,
    pub queries_failed: u64,
    pub records_scanned: u64,
    pub records_matched: u64,
    pub records_skipped: u64,
}
