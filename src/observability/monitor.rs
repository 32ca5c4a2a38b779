use std::sync::Arc;
use super::{CounterSet, MetricsCollector};

/// Renders node metrics and named counters as a plain-text report
pub struct GraphMonitor {
    collector: MetricsCollector,
    counters: Arc<CounterSet>,
}

impl GraphMonitor {
    pub fn new(collector: MetricsCollector, counters: Arc<CounterSet>) -> Self {
        Self { collector, counters }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.collector.snapshot();
        let counters = self.counters.snapshot();

        if snapshot.is_empty() && counters.is_empty() {
            return "No nodes registered".to_string();
        }

        let mut report = String::from("=== Node Metrics ===\n");

        for (node_id, metrics) in snapshot.iter() {
            report.push_str(&format!(
                "\n[{}]\n  Ticks: {} ticks processed\n  Packets: {} emitted\n  Stops: {}\n  Errors: {}\n  Avg Latency: {}μs\n",
                node_id,
                metrics.ticks_processed,
                metrics.packets_emitted,
                metrics.stops,
                if metrics.errors_count > 0 {
                    format!("{} error{}", metrics.errors_count, if metrics.errors_count == 1 { "" } else { "s" })
                } else {
                    "0 errors".to_string()
                },
                metrics.avg_latency_us
            ));
        }

        if !counters.is_empty() {
            report.push_str("\n=== Counters ===\n");
            for (name, value) in counters {
                report.push_str(&format!("  {}: {}\n", name, value));
            }
        }

        report
    }
}
