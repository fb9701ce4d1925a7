//! Logger metrics for observability
//!
//! Counters for every decision the pipeline makes about a record after it
//! passed the level gate, plus delivery statistics for batches.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// Each Logger instance owns one set of counters; children start from zero.
///
/// # Example
///
/// ```
/// use rust_client_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_accepted();
/// metrics.record_rate_limited();
///
/// assert_eq!(metrics.accepted(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records pushed onto the batch queue
    accepted: AtomicU64,

    /// Records rejected by the rate limiter
    rate_limited: AtomicU64,

    /// Records discarded by sampling
    sampled_out: AtomicU64,

    /// Log calls made after dispose
    dropped_after_dispose: AtomicU64,

    /// Batches handed to the transports
    batches_flushed: AtomicU64,

    /// Records contained in those batches
    records_delivered: AtomicU64,

    /// Individual transport operations that failed or panicked
    transport_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            sampled_out: AtomicU64::new(0),
            dropped_after_dispose: AtomicU64::new(0),
            batches_flushed: AtomicU64::new(0),
            records_delivered: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sampled_out(&self) -> u64 {
        self.sampled_out.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_after_dispose(&self) -> u64 {
        self.dropped_after_dispose.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_flushed(&self) -> u64 {
        self.batches_flushed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_delivered(&self) -> u64 {
        self.records_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_failures(&self) -> u64 {
        self.transport_failures.load(Ordering::Relaxed)
    }

    /// Total records dropped by any policy or after dispose
    pub fn dropped_count(&self) -> u64 {
        self.rate_limited() + self.sampled_out() + self.dropped_after_dispose()
    }

    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rate_limited(&self) -> u64 {
        self.rate_limited.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sampled_out(&self) -> u64 {
        self.sampled_out.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped_after_dispose(&self) -> u64 {
        self.dropped_after_dispose.fetch_add(1, Ordering::Relaxed)
    }

    /// Record one batch of `records` handed to the transports
    #[inline]
    pub fn record_batch(&self, records: usize) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.records_delivered
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_transport_failures(&self, count: usize) {
        self.transport_failures
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no records have passed the level gate.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.accepted() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.rate_limited.store(0, Ordering::Relaxed);
        self.sampled_out.store(0, Ordering::Relaxed);
        self.dropped_after_dispose.store(0, Ordering::Relaxed);
        self.batches_flushed.store(0, Ordering::Relaxed);
        self.records_delivered.store(0, Ordering::Relaxed);
        self.transport_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            accepted: AtomicU64::new(self.accepted()),
            rate_limited: AtomicU64::new(self.rate_limited()),
            sampled_out: AtomicU64::new(self.sampled_out()),
            dropped_after_dispose: AtomicU64::new(self.dropped_after_dispose()),
            batches_flushed: AtomicU64::new(self.batches_flushed()),
            records_delivered: AtomicU64::new(self.records_delivered()),
            transport_failures: AtomicU64::new(self.transport_failures()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.accepted(), 0);
        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.batches_flushed(), 0);
        assert_eq!(metrics.transport_failures(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_sampled_out(), 0);
        assert_eq!(metrics.record_sampled_out(), 1);
        assert_eq!(metrics.sampled_out(), 2);
    }

    #[test]
    fn test_dropped_count_sums_all_drop_reasons() {
        let metrics = LoggerMetrics::new();
        metrics.record_rate_limited();
        metrics.record_sampled_out();
        metrics.record_dropped_after_dispose();
        assert_eq!(metrics.dropped_count(), 3);
    }

    #[test]
    fn test_record_batch() {
        let metrics = LoggerMetrics::new();
        metrics.record_batch(20);
        metrics.record_batch(3);
        assert_eq!(metrics.batches_flushed(), 2);
        assert_eq!(metrics.records_delivered(), 23);
    }

    #[test]
    fn test_metrics_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_accepted();
        }
        for _ in 0..10 {
            metrics.record_rate_limited();
        }

        // 10 out of 100 = 10%
        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "Drop rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_accepted();
        metrics.record_batch(1);
        metrics.record_transport_failures(2);

        metrics.reset();

        assert_eq!(metrics.accepted(), 0);
        assert_eq!(metrics.records_delivered(), 0);
        assert_eq!(metrics.transport_failures(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_accepted();

        let snapshot = metrics.clone();
        metrics.record_accepted();

        assert_eq!(metrics.accepted(), 2);
        assert_eq!(snapshot.accepted(), 1);
    }
}
