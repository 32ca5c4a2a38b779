use anyhow::Result;
use std::sync::Arc;
use tickgraph::core::{Packet, PortCollection, PortId, Timestamp};
use tickgraph::engine::{NodeConfig, NodeRunner};
use tickgraph::formats::NormalizedRect;
use tickgraph::nodes::{INPUT_ITERABLE, OUTPUT_ITERABLE};
use tickgraph::observability::{ChannelSink, CounterSet, Diagnostics, GraphMonitor, MetricsCollector};
use tickgraph::registry::{register_builtin_nodes, NodeRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry)?;
    for meta in registry.list() {
        tracing::info!(node_type = %meta.type_name, name = %meta.name, "available node");
    }

    let counters = Arc::new(CounterSet::new());
    let (sink, lines) = ChannelSink::bounded(1024);
    let diagnostics = Diagnostics::new(counters.clone(), Arc::new(sink));

    // Diagnostic lines are written off the processing path.
    let writer = tokio::task::spawn_blocking(move || {
        for line in lines {
            tracing::info!(target: "tickgraph::diagnostics", "{}", line);
        }
    });

    let logger_config = NodeConfig::from_json(serde_json::json!({
        "type": "PassThroughNode",
        "id": "logger",
        "inputs": ["RECTS", "0"],
        "options": { "log_tag": "demo" }
    }))?;
    let broadcast_config = NodeConfig::from_json(serde_json::json!({
        "type": "BroadcastNode",
        "id": "broadcast",
        "inputs": [INPUT_ITERABLE],
        "outputs": [OUTPUT_ITERABLE],
        "options": { "replication_count": 3 }
    }))?;

    let mut logger = NodeRunner::from_config(&registry, &logger_config, diagnostics.clone())?;
    let mut broadcast = NodeRunner::from_config(&registry, &broadcast_config, diagnostics)?;

    logger
        .open(&logger_config.options, PortCollection::new(), PortCollection::new())
        .await?;
    broadcast
        .open(&broadcast_config.options, PortCollection::new(), PortCollection::new())
        .await?;

    let face = NormalizedRect::new(0.5, 0.4, 0.2, 0.3).with_id(1);
    for tick in 0..3 {
        let timestamp = Timestamp::new(tick * 33_333);
        let input = Packet::new(vec![face.clone()], timestamp);

        let fanned = broadcast
            .process(timestamp, [(PortId::tag(INPUT_ITERABLE), input)])
            .await?;

        let forwarded: Vec<(PortId, Packet)> = fanned
            .packets_on(&PortId::tag(OUTPUT_ITERABLE))
            .iter()
            .map(|packet| (PortId::tag("RECTS"), packet.clone()))
            .collect();
        let out = logger.process(timestamp, forwarded).await?;
        tracing::info!(tick, packets = out.packet_count(), "tick complete");
    }

    // Nothing arrives on any input: the logger asks to stop.
    let end = logger.process(Timestamp::new(100_000), Vec::new()).await?;
    tracing::info!(outcome = ?end.outcome, "final tick");

    logger.close().await?;
    broadcast.close().await?;

    let mut collector = MetricsCollector::new();
    collector.register(logger.metrics());
    collector.register(broadcast.metrics());

    // The writer finishes once every sender is gone.
    drop(logger);
    drop(broadcast);
    writer.await?;

    println!("{}", GraphMonitor::new(collector, counters).generate_report());

    Ok(())
}
