use tickgraph::observability::{MetricsCollector, NodeMetrics};
use std::sync::Arc;

#[test]
fn test_collector_registration() {
    let mut collector = MetricsCollector::new();
    let metrics = Arc::new(NodeMetrics::new("node1"));

    collector.register(metrics.clone());

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains_key("node1"));
    assert!(Arc::ptr_eq(&collector.get_node_metrics("node1").unwrap(), &metrics));
}

#[test]
fn test_collector_aggregation() {
    let mut collector = MetricsCollector::new();

    let m1 = Arc::new(NodeMetrics::new("node1"));
    let m2 = Arc::new(NodeMetrics::new("node2"));

    m1.record_tick(2);
    m1.record_tick(1);
    m2.record_tick(0);
    m2.record_stop();

    collector.register(m1);
    collector.register(m2);

    let snapshot = collector.snapshot();

    assert_eq!(snapshot.get("node1").unwrap().ticks_processed, 2);
    assert_eq!(snapshot.get("node1").unwrap().packets_emitted, 3);
    assert_eq!(snapshot.get("node2").unwrap().stops, 1);
}
