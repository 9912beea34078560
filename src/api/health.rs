//! Shared counters for the /health endpoint.
//! Updated by the analyze handler after every request.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct HealthState {
    /// Analyses that returned a result.
    pub analyses_ok: AtomicU64,
    /// Analyses that ended in an error, including rejected requests.
    pub analyses_failed: AtomicU64,
    /// Nanosecond timestamp of the last completed analysis (0 = none).
    pub last_analysis_at_ns: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ok(&self, at_ns: u64) {
        self.analyses_ok.fetch_add(1, Ordering::Relaxed);
        self.last_analysis_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn record_failed(&self, at_ns: u64) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
        self.last_analysis_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn analyses_ok(&self) -> u64 {
        self.analyses_ok.load(Ordering::Relaxed)
    }

    pub fn analyses_failed(&self) -> u64 {
        self.analyses_failed.load(Ordering::Relaxed)
    }

    pub fn last_analysis_at_ns(&self) -> u64 {
        self.last_analysis_at_ns.load(Ordering::Relaxed)
    }
}
