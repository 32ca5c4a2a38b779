use crate::core::{
    CalculatorNode, ConfigError, Contract, NodeError, OpenContext, Packet, Payload, Port, PortId,
    ProcessOutcome, TickContext,
};
use crate::observability::DiagnosticLine;
use async_trait::async_trait;
use serde::Deserialize;
use tickgraph_macros::NodeType;

/// Counter bumped once per forwarded packet.
pub const PASS_THROUGH_COUNTER: &str = "PassThrough";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PassThroughOptions {
    log_tag: String,
}

/// Forwards every input stream, unchanged, to the output with the same
/// tag or index. Any number of streams of any type.
///
/// Input headers are copied to the outputs at open. Input side packets
/// are copied to output side packets when outputs are declared, and
/// ignored otherwise. Each forwarded packet bumps the `PassThrough`
/// counter and writes one diagnostic line carrying `log_tag`.
///
/// A tick where no input carries a packet stops the node.
#[derive(NodeType, Debug, Default)]
#[node_meta(name = "Pass Through", category = "Utilities")]
pub struct PassThroughNode {
    #[param(default = "\"\"")]
    log_tag: String,
}

impl PassThroughNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_tag(&self) -> &str {
        &self.log_tag
    }
}

#[async_trait]
impl CalculatorNode for PassThroughNode {
    fn negotiate(&self, contract: &mut Contract) -> Result<(), ConfigError> {
        if contract.inputs().is_empty() {
            return Err(ConfigError::NoInputs);
        }

        let stream_ids: Vec<PortId> = contract.inputs().ids().cloned().collect();
        if contract.outputs().is_empty() {
            for id in &stream_ids {
                contract.outputs_mut().insert(id.clone(), Port::new())?;
            }
        } else if !contract.inputs().same_ids_as(contract.outputs()) {
            return Err(ConfigError::StreamMismatch);
        }

        for (_, port) in contract.inputs_mut().iter_mut() {
            port.set_any();
        }
        for (id, port) in contract.outputs_mut().iter_mut() {
            port.set_same_as(id.clone());
        }

        for (_, port) in contract.input_side_packets_mut().iter_mut() {
            port.set_any();
        }
        if !contract.output_side_packets().is_empty() {
            if !contract
                .input_side_packets()
                .same_ids_as(contract.output_side_packets())
            {
                return Err(ConfigError::SidePacketMismatch);
            }
            for (id, port) in contract.output_side_packets_mut().iter_mut() {
                port.set_same_as(id.clone());
            }
        }

        Ok(())
    }

    async fn open(&mut self, cx: &mut OpenContext<'_>) -> Result<(), NodeError> {
        let options: PassThroughOptions = cx.options_as()?;

        let streams: Vec<PortId> = cx.contract().inputs().ids().cloned().collect();
        for id in streams {
            if let Some(header) = cx.input_header(&id).cloned() {
                cx.set_output_header(&id, header)?;
            }
        }

        if cx.has_output_side_packets() {
            let side_packets: Vec<(PortId, Payload)> = cx
                .input_side_packets()
                .iter()
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect();
            for (id, value) in side_packets {
                cx.set_output_side_packet(&id, value)?;
            }
        }

        cx.set_offset(0);
        self.log_tag = options.log_tag;

        tracing::debug!(
            log_tag = %self.log_tag,
            streams = cx.contract().inputs().len(),
            "pass-through node opened"
        );
        Ok(())
    }

    async fn process(&mut self, cx: &mut TickContext<'_>) -> Result<ProcessOutcome, NodeError> {
        let timestamp = cx.timestamp();
        let present: Vec<(PortId, Packet)> = cx
            .inputs()
            .iter()
            .filter_map(|(id, packet)| packet.as_ref().map(|p| (id.clone(), p.clone())))
            .collect();

        if present.is_empty() {
            return Ok(ProcessOutcome::Stop);
        }

        let counter = cx.diagnostics().counter(PASS_THROUGH_COUNTER);
        for (id, packet) in present {
            tracing::trace!(port = %id, timestamp = %timestamp, "passing packet");
            cx.emit(&id, packet.at(timestamp))?;

            counter.increment();
            cx.diagnostics().emit(DiagnosticLine::capture(
                &self.log_tag,
                packet.timestamp(),
                timestamp,
            ));
        }

        Ok(ProcessOutcome::Continue)
    }
}
