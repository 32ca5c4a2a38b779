use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Per-instance runtime statistics, updated by the node runner
pub struct NodeMetrics {
    node_id: String,
    ticks_processed: AtomicU64,
    stops: AtomicU64,
    errors_count: AtomicU64,
    packets_emitted: AtomicU64,
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

impl NodeMetrics {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            ticks_processed: AtomicU64::new(0),
            stops: AtomicU64::new(0),
            errors_count: AtomicU64::new(0),
            packets_emitted: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn ticks_processed(&self) -> u64 {
        self.ticks_processed.load(Ordering::Relaxed)
    }

    pub fn stops(&self) -> u64 {
        self.stops.load(Ordering::Relaxed)
    }

    pub fn errors_count(&self) -> u64 {
        self.errors_count.load(Ordering::Relaxed)
    }

    pub fn packets_emitted(&self) -> u64 {
        self.packets_emitted.load(Ordering::Relaxed)
    }

    pub fn record_tick(&self, packets: usize) {
        self.ticks_processed.fetch_add(1, Ordering::Relaxed);
        self.packets_emitted.fetch_add(packets as u64, Ordering::Relaxed);
    }

    pub fn record_stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_processing(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_processing(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }
}
