//! Routing counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters shared by all requests of a router.
#[derive(Debug, Default)]
pub struct RoutingStats {
    requests: AtomicU64,
    no_path: AtomicU64,
    search_errors: AtomicU64,
    substituted_gaps: AtomicU64,
    integrity_violations: AtomicU64,
}

/// A point-in-time copy of [`RoutingStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoutingStatsSnapshot {
    pub requests: u64,
    /// Searches that returned no path, including failed ones.
    pub no_path: u64,
    pub search_errors: u64,
    /// Transit rides replaced by a teleport because the departure was past
    /// the schedule horizon.
    pub substituted_gaps: u64,
    /// Transit rides dropped because the schedule had no matching route.
    pub integrity_violations: u64,
}

impl RoutingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_no_path(&self) {
        self.no_path.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_search_error(&self) {
        self.search_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_gaps(&self, substituted: usize, violations: usize) {
        self.substituted_gaps
            .fetch_add(substituted as u64, Ordering::Relaxed);
        self.integrity_violations
            .fetch_add(violations as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RoutingStatsSnapshot {
        RoutingStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            no_path: self.no_path.load(Ordering::Relaxed),
            search_errors: self.search_errors.load(Ordering::Relaxed),
            substituted_gaps: self.substituted_gaps.load(Ordering::Relaxed),
            integrity_violations: self.integrity_violations.load(Ordering::Relaxed),
        }
    }
}
