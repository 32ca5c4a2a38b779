use super::{
    ConfigError, Contract, Packet, Payload, PortCollection, PortId, RuntimeError, Timestamp,
};
use crate::observability::Diagnostics;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What a node sees while opening: options, input headers, side packets,
/// and the set-once output header / output side packet slots.
///
/// Headers and side packets can only be written here; the tick context
/// has no way to reach them.
pub struct OpenContext<'a> {
    options: &'a Value,
    contract: &'a Contract,
    input_side_packets: &'a PortCollection<Payload>,
    output_headers: &'a mut PortCollection<Option<Payload>>,
    output_side_packets: &'a mut PortCollection<Option<Payload>>,
    offset: &'a mut Option<i64>,
    diagnostics: &'a Diagnostics,
}

impl<'a> OpenContext<'a> {
    pub(crate) fn new(
        options: &'a Value,
        contract: &'a Contract,
        input_side_packets: &'a PortCollection<Payload>,
        output_headers: &'a mut PortCollection<Option<Payload>>,
        output_side_packets: &'a mut PortCollection<Option<Payload>>,
        offset: &'a mut Option<i64>,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            options,
            contract,
            input_side_packets,
            output_headers,
            output_side_packets,
            offset,
            diagnostics,
        }
    }

    /// Deserialize the node options. Missing options behave like `{}`.
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let options = match self.options {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        Ok(serde_json::from_value(options)?)
    }

    pub fn contract(&self) -> &Contract {
        self.contract
    }

    pub fn input_header(&self, id: &PortId) -> Option<&Payload> {
        self.contract.inputs().get(id).and_then(|port| port.header())
    }

    pub fn set_output_header(&mut self, id: &PortId, header: Payload) -> Result<(), ConfigError> {
        let slot = self
            .output_headers
            .get_mut(id)
            .ok_or_else(|| ConfigError::UnexpectedPort { port: id.clone() })?;
        if slot.is_some() {
            return Err(ConfigError::HeaderAlreadySet { port: id.clone() });
        }
        *slot = Some(header);
        Ok(())
    }

    pub fn input_side_packets(&self) -> &PortCollection<Payload> {
        self.input_side_packets
    }

    pub fn has_output_side_packets(&self) -> bool {
        !self.output_side_packets.is_empty()
    }

    pub fn set_output_side_packet(&mut self, id: &PortId, value: Payload) -> Result<(), ConfigError> {
        let slot = self
            .output_side_packets
            .get_mut(id)
            .ok_or_else(|| ConfigError::UnexpectedPort { port: id.clone() })?;
        if slot.is_some() {
            return Err(ConfigError::SidePacketAlreadySet { port: id.clone() });
        }
        *slot = Some(value);
        Ok(())
    }

    /// Promise that every output packet is stamped at least `diff` after
    /// the tick that produced it.
    pub fn set_offset(&mut self, diff: i64) {
        *self.offset = Some(diff);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.diagnostics
    }
}

/// Packets emitted on one output stream, plus its timestamp bound
#[derive(Debug, Default)]
pub(crate) struct OutputStream {
    pub(crate) last: Option<Timestamp>,
    pub(crate) pending: Vec<Packet>,
}

/// Per-tick view: the tick timestamp, the packet (if any) on each input,
/// and the output streams to emit into.
pub struct TickContext<'a> {
    timestamp: Timestamp,
    contract: &'a Contract,
    offset: Option<i64>,
    inputs: &'a PortCollection<Option<Packet>>,
    outputs: &'a mut PortCollection<OutputStream>,
    diagnostics: &'a Diagnostics,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(
        timestamp: Timestamp,
        contract: &'a Contract,
        offset: Option<i64>,
        inputs: &'a PortCollection<Option<Packet>>,
        outputs: &'a mut PortCollection<OutputStream>,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            timestamp,
            contract,
            offset,
            inputs,
            outputs,
            diagnostics,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Every declared input in declaration order, `None` where no packet
    /// arrived this tick.
    pub fn inputs(&self) -> &PortCollection<Option<Packet>> {
        self.inputs
    }

    pub fn input(&self, id: &PortId) -> Option<&Packet> {
        self.inputs.get(id).and_then(|p| p.as_ref())
    }

    pub fn emit(&mut self, id: &PortId, packet: Packet) -> Result<(), RuntimeError> {
        let stream = self
            .outputs
            .get_mut(id)
            .ok_or_else(|| RuntimeError::UnknownPort { port: id.clone() })?;

        if let Some(expected) = self.contract.output_type(id) {
            if packet.value_type() != expected {
                return Err(RuntimeError::TypeMismatch {
                    port: id.clone(),
                    expected,
                    found: packet.value_type(),
                });
            }
        }

        let offset_bound = self.offset.map(|diff| self.timestamp.offset(diff));
        let stream_bound = stream.last.map(|last| last.offset(1));
        if let Some(bound) = offset_bound.max(stream_bound) {
            if packet.timestamp() < bound {
                return Err(RuntimeError::TimestampBound {
                    port: id.clone(),
                    timestamp: packet.timestamp(),
                    bound,
                });
            }
        }

        stream.last = Some(packet.timestamp());
        stream.pending.push(packet);
        Ok(())
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.diagnostics
    }
}
