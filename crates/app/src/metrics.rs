use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,

    // Timing (in microseconds)
    total_extract_time_us: AtomicU64,

    // Counts
    total_fields_extracted: AtomicUsize,
    total_candidates_skipped: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            client_errors: AtomicUsize::new(0),
            server_errors: AtomicUsize::new(0),
            total_extract_time_us: AtomicU64::new(0),
            total_fields_extracted: AtomicUsize::new(0),
            total_candidates_skipped: AtomicUsize::new(0),
        })
    }

    pub fn record_success(&self, duration: Duration, fields: usize, skipped: usize) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_extract_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_fields_extracted.fetch_add(fields, Ordering::Relaxed);
        self.total_candidates_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    pub fn record_failure(&self, client_error: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if client_error {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let total_us = self.total_extract_time_us.load(Ordering::Relaxed) as f64;

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: successful,
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            avg_extract_time_ms: if successful > 0 {
                total_us / successful as f64 / 1000.0 // Convert to ms
            } else {
                0.0
            },
            total_fields_extracted: self.total_fields_extracted.load(Ordering::Relaxed),
            total_candidates_skipped: self.total_candidates_skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub client_errors: usize,
    pub server_errors: usize,
    pub avg_extract_time_ms: f64,
    pub total_fields_extracted: usize,
    pub total_candidates_skipped: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.record_success(Duration::from_millis(4), 3, 2);
        metrics.record_success(Duration::from_millis(2), 1, 0);
        metrics.record_failure(true);
        metrics.record_failure(false);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 4);
        assert_eq!(snap.successful_requests, 2);
        assert_eq!(snap.client_errors, 1);
        assert_eq!(snap.server_errors, 1);
        assert_eq!(snap.total_fields_extracted, 4);
        assert_eq!(snap.total_candidates_skipped, 2);
        assert!((snap.avg_extract_time_ms - 3.0).abs() < 1e-9);
    }
}
