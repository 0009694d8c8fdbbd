//! Capture statistics

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statistics for one capture run
#[derive(Debug, Clone, Default)]
pub struct CaptureStats {
    /// Number of packets handed to the sniffer
    pub packets_received: u64,
    /// Number of packets dropped by the kernel
    pub packets_dropped: u64,
    /// Number of packets dropped by the interface
    pub packets_if_dropped: u64,
    /// Total captured bytes
    pub bytes_received: u64,
    /// Capture duration
    pub duration: Duration,
}

impl CaptureStats {
    /// Drop rate as percentage of everything the kernel saw
    pub fn drop_rate(&self) -> f64 {
        let total = self.packets_received + self.packets_dropped;
        if total == 0 {
            return 0.0;
        }
        (self.packets_dropped as f64 / total as f64) * 100.0
    }

    pub fn packets_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.packets_received as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} packets ({} bytes), dropped {} ({:.2}%), interface dropped {}, {:.2}s at {:.2} pps",
            self.packets_received,
            self.bytes_received,
            self.packets_dropped,
            self.drop_rate(),
            self.packets_if_dropped,
            self.duration.as_secs_f64(),
            self.packets_per_second()
        )
    }
}

/// Thread-safe statistics accumulator for live capture
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    packets_received: Arc<AtomicU64>,
    packets_dropped: Arc<AtomicU64>,
    packets_if_dropped: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    start_time: Instant,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            packets_received: Arc::new(AtomicU64::new(0)),
            packets_dropped: Arc::new(AtomicU64::new(0)),
            packets_if_dropped: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a captured packet
    pub fn record_packet(&self, size: usize) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(size as u64, Ordering::Relaxed);
    }

    /// Store the kernel's cumulative drop counters
    pub fn record_drops(&self, dropped: u64, if_dropped: u64) {
        self.packets_dropped.store(dropped, Ordering::Relaxed);
        self.packets_if_dropped.store(if_dropped, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            packets_dropped: self.packets_dropped.load(Ordering::Relaxed),
            packets_if_dropped: self.packets_if_dropped.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            duration: self.start_time.elapsed(),
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
