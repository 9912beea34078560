//! Wall-clock time of `/api/props/analyze` requests, validation failures
//! included, served back as percentiles on `/stats/latency`.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;

use crate::config::{STATS_MAX_PAGES, UPSTREAM_TIMEOUT_SECS};

/// Sequential upstream calls one analysis can make: the player search plus
/// every stats page.
const UPSTREAM_CALLS_PER_ANALYSIS: u32 = 1 + STATS_MAX_PAGES as u32;

/// Analysis latency percentiles in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Percentiles {
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

pub struct LatencyStats {
    histogram: Mutex<Histogram<u64>>,
    ceiling_us: u64,
}

impl LatencyStats {
    /// Sized so the slowest possible analysis, every upstream call running
    /// into its timeout, still lands inside the histogram.
    pub fn for_upstream_timeout(timeout: Duration) -> Self {
        let worst_case = timeout.max(Duration::from_secs(1)) * UPSTREAM_CALLS_PER_ANALYSIS;
        let ceiling_us = worst_case.as_micros().min(u64::MAX as u128) as u64;
        let histogram = Histogram::new_with_bounds(1, ceiling_us, 3)
            .expect("ceiling is at least one second");
        Self {
            histogram: Mutex::new(histogram),
            ceiling_us,
        }
    }

    pub fn ceiling(&self) -> Duration {
        Duration::from_micros(self.ceiling_us)
    }

    /// Samples past the ceiling are pinned to it.
    pub fn record(&self, elapsed: Duration) {
        let us = (elapsed.as_micros().min(self.ceiling_us as u128) as u64).max(1);
        if let Ok(mut h) = self.histogram.lock() {
            let _ = h.record(us);
        }
    }

    /// None until the first analysis has been recorded.
    pub fn percentiles(&self) -> Option<Percentiles> {
        let h = self.histogram.lock().ok()?;
        if h.len() == 0 {
            return None;
        }
        Some(Percentiles {
            p50_us: h.value_at_quantile(0.50),
            p95_us: h.value_at_quantile(0.95),
            p99_us: h.value_at_quantile(0.99),
        })
    }

    pub fn len(&self) -> u64 {
        self.histogram.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::for_upstream_timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_percentiles_before_first_analysis() {
        let stats = LatencyStats::default();
        assert_eq!(stats.percentiles(), None);
        assert_eq!(stats.len(), 0);
    }

    #[test]
    fn ceiling_covers_every_call_timing_out() {
        let stats = LatencyStats::for_upstream_timeout(Duration::from_secs(10));
        assert_eq!(stats.ceiling(), Duration::from_secs(10) * UPSTREAM_CALLS_PER_ANALYSIS);
    }

    #[test]
    fn slow_analysis_is_pinned_to_ceiling() {
        let stats = LatencyStats::for_upstream_timeout(Duration::from_secs(1));
        stats.record(Duration::from_secs(3600));
        let p = stats.percentiles().unwrap();
        let ceiling = stats.ceiling().as_micros() as u64;
        // hdrhistogram reports bucket edges within 0.1% at 3 significant figures
        assert!(p.p99_us.abs_diff(ceiling) <= ceiling / 500, "p99 = {}", p.p99_us);
    }

    #[test]
    fn percentiles_track_samples() {
        let stats = LatencyStats::default();
        for ms in 1..=100u64 {
            stats.record(Duration::from_millis(ms));
        }
        let p = stats.percentiles().unwrap();
        assert!((49_000..=51_000).contains(&p.p50_us), "p50 = {}", p.p50_us);
        assert!(p.p95_us >= p.p50_us);
        assert!(p.p99_us >= p.p95_us);
        assert_eq!(stats.len(), 100);
    }
}
