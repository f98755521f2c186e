//! Frame production metrics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};
use serde::Serialize;

/// Counters kept per source and mirrored to the `metrics` facade.
#[derive(Debug, Default)]
pub struct SourceMetrics {
    frames: AtomicU64,
    errors: AtomicU64,
    fetches: AtomicU64,
    fetch_us_total: AtomicU64,
    fetch_us_max: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub frames: u64,
    pub errors: u64,
    pub avg_fetch_ms: f64,
    pub max_fetch_ms: f64,
}

impl SourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&self, elapsed: Duration) {
        let us = elapsed.as_micros() as u64;
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.fetch_us_total.fetch_add(us, Ordering::Relaxed);
        self.fetch_us_max.fetch_max(us, Ordering::Relaxed);
        histogram!("wms_fetch_duration_ms").record(us as f64 / 1000.0);
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        counter!("wms_frames_total").increment(1);
    }

    pub fn record_error(&self, category: &'static str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("wms_frame_errors_total", "category" => category).increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let fetches = self.fetches.load(Ordering::Relaxed);
        let total_us = self.fetch_us_total.load(Ordering::Relaxed);
        MetricsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            avg_fetch_ms: if fetches == 0 {
                0.0
            } else {
                total_us as f64 / fetches as f64 / 1000.0
            },
            max_fetch_ms: self.fetch_us_max.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let m = SourceMetrics::new();
        assert_eq!(m.snapshot().avg_fetch_ms, 0.0);

        m.record_fetch(Duration::from_millis(10));
        m.record_frame();
        m.record_fetch(Duration::from_millis(30));
        m.record_frame();
        m.record_error("TransportError");

        let s = m.snapshot();
        assert_eq!(s.frames, 2);
        assert_eq!(s.errors, 1);
        assert_eq!(s.avg_fetch_ms, 20.0);
        assert_eq!(s.max_fetch_ms, 30.0);
    }
}
