use crate::core::{
    CalculatorNode, ConfigError, Contract, NodeError, OpenContext, Packet, PortCollection, PortId,
    PortType, ProcessOutcome, RuntimeError, TickContext, ValueType,
};
use crate::formats::NormalizedRect;
use async_trait::async_trait;
use serde::Deserialize;
use tickgraph_macros::NodeType;

pub const INPUT_ITERABLE: &str = "INPUT_ITERABLE";
pub const OUTPUT_ITERABLE: &str = "OUTPUT_ITERABLE";

/// Sequence type carried on both broadcast streams
pub type RectList = Vec<NormalizedRect>;

/// Largest accepted `replication_count`; the option is a 32-bit int.
pub const MAX_REPLICATION_COUNT: i64 = i32::MAX as i64;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BroadcastOptions {
    #[serde(alias = "number_detections")]
    replication_count: i64,
}

/// Emits `replication_count` copies of the first element of its input
/// sequence, at the input's timestamp.
#[derive(NodeType, Debug, Default)]
#[node_meta(name = "Broadcast", category = "Utilities")]
pub struct BroadcastNode {
    #[input(tag = "INPUT_ITERABLE", data_type = "Vec<NormalizedRect>")]
    _input: (),

    #[output(tag = "OUTPUT_ITERABLE", data_type = "Vec<NormalizedRect>")]
    _output: (),

    #[param(default = "0", min = 0.0, max = 2147483647.0)]
    replication_count: usize,
}

impl BroadcastNode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `count` independent copies of `items[0]`.
///
/// Fails with `InvalidState` when `items` is empty, whatever `count` is,
/// or when `count` copies cannot be allocated.
pub fn replicate_first<T: Clone>(items: &[T], count: usize) -> Result<Vec<T>, RuntimeError> {
    let first = items
        .first()
        .ok_or_else(|| RuntimeError::invalid_state("empty input"))?;

    let mut out = Vec::new();
    out.try_reserve_exact(count).map_err(|e| {
        RuntimeError::invalid_state(format!("cannot allocate {} elements: {}", count, e))
    })?;
    out.resize(count, first.clone());
    Ok(out)
}

fn checked_count(value: i64) -> Result<usize, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeOption {
            option: "replication_count",
            value,
        });
    }
    if value > MAX_REPLICATION_COUNT {
        return Err(ConfigError::OptionOutOfRange {
            option: "replication_count",
            value,
            max: MAX_REPLICATION_COUNT,
        });
    }
    usize::try_from(value).map_err(|_| ConfigError::OptionOutOfRange {
        option: "replication_count",
        value,
        max: MAX_REPLICATION_COUNT,
    })
}

fn claim_single(ports: &mut PortCollection, tag: &str) -> Result<(), ConfigError> {
    let id = PortId::tag(tag);
    if let Some(extra) = ports.ids().find(|other| **other != id) {
        return Err(ConfigError::UnexpectedPort { port: extra.clone() });
    }

    let port = ports
        .get_mut(&id)
        .ok_or_else(|| ConfigError::MissingPort { port: id.clone() })?;

    let expected = ValueType::of::<RectList>();
    if let PortType::Exact(found) = port.port_type() {
        if *found != expected {
            return Err(ConfigError::PortType {
                port: id,
                expected,
                found: *found,
            });
        }
    }
    port.set::<RectList>();
    Ok(())
}

#[async_trait]
impl CalculatorNode for BroadcastNode {
    fn negotiate(&self, contract: &mut Contract) -> Result<(), ConfigError> {
        claim_single(contract.inputs_mut(), INPUT_ITERABLE)?;
        claim_single(contract.outputs_mut(), OUTPUT_ITERABLE)
    }

    async fn open(&mut self, cx: &mut OpenContext<'_>) -> Result<(), NodeError> {
        let options: BroadcastOptions = cx.options_as()?;
        self.replication_count = checked_count(options.replication_count)?;
        cx.set_offset(0);
        Ok(())
    }

    async fn process(&mut self, cx: &mut TickContext<'_>) -> Result<ProcessOutcome, NodeError> {
        let timestamp = cx.timestamp();
        let rects = cx
            .input(&PortId::tag(INPUT_ITERABLE))
            .and_then(|packet| packet.get::<RectList>())
            .ok_or_else(|| RuntimeError::invalid_state("no sequence on INPUT_ITERABLE"))?;

        let output = replicate_first(rects, self.replication_count)?;
        tracing::info!(len = output.len(), "BroadcastNode emitted sequence");

        cx.emit(&PortId::tag(OUTPUT_ITERABLE), Packet::new(output, timestamp))?;
        Ok(ProcessOutcome::Continue)
    }
}
