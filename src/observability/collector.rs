use std::collections::BTreeMap;
use std::sync::Arc;
use super::NodeMetrics;

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub node_id: String,
    pub ticks_processed: u64,
    pub stops: u64,
    pub errors_count: u64,
    pub packets_emitted: u64,
    pub avg_latency_us: u64,
}

/// Node metrics keyed by node id, iterated in id order
#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: BTreeMap<String, Arc<NodeMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, metrics: Arc<NodeMetrics>) {
        self.metrics.insert(metrics.node_id().to_string(), metrics);
    }

    pub fn snapshot(&self) -> BTreeMap<String, MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|(id, metrics)| {
                (
                    id.clone(),
                    MetricsSnapshot {
                        node_id: metrics.node_id().to_string(),
                        ticks_processed: metrics.ticks_processed(),
                        stops: metrics.stops(),
                        errors_count: metrics.errors_count(),
                        packets_emitted: metrics.packets_emitted(),
                        avg_latency_us: metrics.avg_latency_us(),
                    },
                )
            })
            .collect()
    }

    pub fn get_node_metrics(&self, node_id: &str) -> Option<Arc<NodeMetrics>> {
        self.metrics.get(node_id).cloned()
    }
}
