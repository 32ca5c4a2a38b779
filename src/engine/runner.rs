use super::{NodeConfig, NodeState};
use crate::core::context::OutputStream;
use crate::core::{
    CalculatorNode, ConfigError, Contract, NodeError, OpenContext, Packet, Payload,
    PortCollection, PortId, ProcessOutcome, RuntimeError, TickContext, Timestamp,
};
use crate::observability::{Diagnostics, NodeMetrics};
use crate::registry::NodeRegistry;
use serde_json::Value;
use std::sync::Arc;

/// Packets produced by one tick, grouped by output stream
#[derive(Debug)]
pub struct TickOutput {
    pub outcome: ProcessOutcome,
    pub packets: PortCollection<Vec<Packet>>,
}

impl TickOutput {
    pub fn packets_on(&self, id: &PortId) -> &[Packet] {
        self.packets.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn packet_count(&self) -> usize {
        self.packets.iter().map(|(_, p)| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packet_count() == 0
    }
}

/// Drives one node instance through its lifecycle on behalf of a scheduler.
///
/// Calls out of order are rejected before they reach the node. Input
/// packets are checked against the negotiated contract, emitted packets
/// against the output types and timestamp bounds.
pub struct NodeRunner {
    node_id: String,
    node: Box<dyn CalculatorNode>,
    state: NodeState,
    contract: Contract,
    offset: Option<i64>,
    input_side_packets: PortCollection<Payload>,
    output_headers: PortCollection<Option<Payload>>,
    output_side_packets: PortCollection<Option<Payload>>,
    outputs: PortCollection<OutputStream>,
    last_tick: Option<Timestamp>,
    diagnostics: Diagnostics,
    metrics: Arc<NodeMetrics>,
}

impl NodeRunner {
    pub fn new(node_id: impl Into<String>, node: Box<dyn CalculatorNode>, diagnostics: Diagnostics) -> Self {
        let node_id = node_id.into();
        Self {
            metrics: Arc::new(NodeMetrics::new(node_id.clone())),
            node_id,
            node,
            state: NodeState::Created,
            contract: Contract::default(),
            offset: None,
            input_side_packets: PortCollection::new(),
            output_headers: PortCollection::new(),
            output_side_packets: PortCollection::new(),
            outputs: PortCollection::new(),
            last_tick: None,
            diagnostics,
        }
    }

    /// Instantiate `config.node_type` from the registry and negotiate the
    /// declared ports. The returned runner is ready to open.
    pub fn from_config(
        registry: &NodeRegistry,
        config: &NodeConfig,
        diagnostics: Diagnostics,
    ) -> Result<Self, NodeError> {
        let node = registry.create(&config.node_type)?;
        let mut runner = Self::new(config.instance_id(), node, diagnostics);
        runner.negotiate(config.contract()?)?;
        Ok(runner)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn metrics(&self) -> Arc<NodeMetrics> {
        self.metrics.clone()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn output_header(&self, id: &PortId) -> Option<&Payload> {
        self.output_headers.get(id).and_then(Option::as_ref)
    }

    pub fn output_side_packets(&self) -> &PortCollection<Option<Payload>> {
        &self.output_side_packets
    }

    pub fn output_side_packet(&self, id: &PortId) -> Option<&Payload> {
        self.output_side_packets.get(id).and_then(Option::as_ref)
    }

    fn enter(&self, target: NodeState, operation: &'static str) -> Result<(), NodeError> {
        if self.state.can_transition_to(&target) {
            Ok(())
        } else {
            Err(NodeError::Lifecycle {
                operation,
                state: self.state.name(),
            })
        }
    }

    fn fail(&mut self, err: impl Into<NodeError>) -> NodeError {
        let err = err.into();
        self.state = NodeState::Failed;
        self.metrics.record_error();
        tracing::warn!(node = %self.node_id, error = %err, "node failed");
        err
    }

    pub fn negotiate(&mut self, declared: Contract) -> Result<&Contract, NodeError> {
        self.enter(NodeState::Negotiated, "negotiate")?;

        let mut contract = declared;
        if let Err(e) = self
            .node
            .negotiate(&mut contract)
            .and_then(|_| contract.validate())
        {
            return Err(self.fail(e));
        }

        self.output_headers = contract.outputs().map(|_, _| None);
        self.output_side_packets = contract.output_side_packets().map(|_, _| None);
        self.outputs = contract.outputs().map(|_, _| OutputStream::default());
        self.contract = contract;
        self.state = NodeState::Negotiated;

        tracing::debug!(
            node = %self.node_id,
            inputs = self.contract.inputs().len(),
            outputs = self.contract.outputs().len(),
            "contract negotiated"
        );
        Ok(&self.contract)
    }

    /// Bind headers and side packets, then open the node with `options`.
    pub async fn open(
        &mut self,
        options: &Value,
        headers: PortCollection<Payload>,
        side_packets: PortCollection<Payload>,
    ) -> Result<(), NodeError> {
        self.enter(NodeState::Open, "open")?;

        if let Err(e) = self.bind_headers(headers) {
            return Err(self.fail(e));
        }
        match self.bind_side_packets(side_packets) {
            Ok(bound) => self.input_side_packets = bound,
            Err(e) => return Err(self.fail(e)),
        }

        let result = {
            let mut cx = OpenContext::new(
                options,
                &self.contract,
                &self.input_side_packets,
                &mut self.output_headers,
                &mut self.output_side_packets,
                &mut self.offset,
                &self.diagnostics,
            );
            self.node.open(&mut cx).await
        };
        if let Err(e) = result {
            return Err(self.fail(e));
        }

        self.state = NodeState::Open;
        tracing::info!(node = %self.node_id, "node opened");
        Ok(())
    }

    fn bind_headers(&mut self, headers: PortCollection<Payload>) -> Result<(), ConfigError> {
        for (id, header) in headers.iter() {
            let port = self
                .contract
                .inputs_mut()
                .get_mut(id)
                .ok_or_else(|| ConfigError::UnexpectedPort { port: id.clone() })?;
            port.header = Some(header.clone());
        }
        Ok(())
    }

    /// Declared side packets in declaration order, each present and of the
    /// declared type.
    fn bind_side_packets(
        &self,
        supplied: PortCollection<Payload>,
    ) -> Result<PortCollection<Payload>, ConfigError> {
        let declared = self.contract.input_side_packets();
        if let Some(id) = supplied.ids().find(|id| !declared.contains(id)) {
            return Err(ConfigError::UnknownSidePacket { port: id.clone() });
        }

        let mut bound = PortCollection::new();
        for id in declared.ids() {
            let value = supplied
                .get(id)
                .ok_or_else(|| ConfigError::MissingSidePacket { port: id.clone() })?;
            if let Some(expected) = self.contract.input_side_packet_type(id) {
                if value.value_type() != expected {
                    return Err(ConfigError::PortType {
                        port: id.clone(),
                        expected,
                        found: value.value_type(),
                    });
                }
            }
            bound.insert(id.clone(), value.clone())?;
        }
        Ok(bound)
    }

    /// Run one tick at `timestamp` with the given input packets.
    pub async fn process(
        &mut self,
        timestamp: Timestamp,
        packets: impl IntoIterator<Item = (PortId, Packet)>,
    ) -> Result<TickOutput, NodeError> {
        if self.state != NodeState::Open {
            return Err(NodeError::Lifecycle {
                operation: "process",
                state: self.state.name(),
            });
        }

        let inputs = match self.collect_inputs(timestamp, packets) {
            Ok(inputs) => inputs,
            Err(e) => return Err(self.fail(e)),
        };
        self.last_tick = Some(timestamp);

        let start = self.metrics.start_processing();
        let result = {
            let mut cx = TickContext::new(
                timestamp,
                &self.contract,
                self.offset,
                &inputs,
                &mut self.outputs,
                &self.diagnostics,
            );
            self.node.process(&mut cx).await
        };
        self.metrics.finish_processing(start);

        let packets = self.outputs.map_mut(|_, stream| std::mem::take(&mut stream.pending));
        let output = match result {
            Ok(outcome) => TickOutput { outcome, packets },
            Err(e) => return Err(self.fail(e)),
        };

        self.metrics.record_tick(output.packet_count());
        if output.outcome == ProcessOutcome::Stop {
            self.metrics.record_stop();
            self.state = NodeState::Stopped;
            tracing::info!(node = %self.node_id, %timestamp, "node requested stop");
        }
        Ok(output)
    }

    fn collect_inputs(
        &self,
        timestamp: Timestamp,
        packets: impl IntoIterator<Item = (PortId, Packet)>,
    ) -> Result<PortCollection<Option<Packet>>, RuntimeError> {
        if !timestamp.is_range_value() {
            return Err(RuntimeError::ReservedTimestamp { timestamp });
        }
        if let Some(previous) = self.last_tick {
            if timestamp <= previous {
                return Err(RuntimeError::NonMonotonicTick {
                    previous,
                    current: timestamp,
                });
            }
        }

        let mut inputs = self.contract.inputs().map(|_, _| None);
        for (id, packet) in packets {
            if let Some(expected) = self.contract.input_type(&id) {
                if packet.value_type() != expected {
                    return Err(RuntimeError::TypeMismatch {
                        port: id,
                        expected,
                        found: packet.value_type(),
                    });
                }
            }
            let slot = inputs
                .get_mut(&id)
                .ok_or_else(|| RuntimeError::UnknownPort { port: id.clone() })?;
            if slot.is_some() {
                return Err(RuntimeError::DuplicateInput { port: id });
            }
            *slot = Some(packet);
        }
        Ok(inputs)
    }

    /// Close the node. Allowed once, from any state but `Created` and
    /// `Closed`.
    pub async fn close(&mut self) -> Result<(), NodeError> {
        self.enter(NodeState::Closed, "close")?;
        let result = self.node.close().await;
        self.state = NodeState::Closed;
        tracing::debug!(node = %self.node_id, "node closed");
        result
    }
}
