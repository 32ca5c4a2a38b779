use super::{ConfigError, PortCollection, PortId, PortType, ValueType};

/// Stream and side packet shape of one node instance.
///
/// The graph declares identifiers; the node's negotiation assigns types
/// (and may fill in outputs). After negotiation the contract is frozen.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    inputs: PortCollection,
    outputs: PortCollection,
    input_side_packets: PortCollection,
    output_side_packets: PortCollection,
}

impl Contract {
    pub fn new(inputs: PortCollection, outputs: PortCollection) -> Self {
        Self {
            inputs,
            outputs,
            input_side_packets: PortCollection::new(),
            output_side_packets: PortCollection::new(),
        }
    }

    /// Untyped contract from bare identifiers.
    pub fn declare<I, O, P, Q>(inputs: I, outputs: O) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        O: IntoIterator<Item = Q>,
        P: Into<PortId>,
        Q: Into<PortId>,
    {
        Ok(Self::new(
            PortCollection::declare(inputs)?,
            PortCollection::declare(outputs)?,
        ))
    }

    pub fn with_side_packets(mut self, inputs: PortCollection, outputs: PortCollection) -> Self {
        self.input_side_packets = inputs;
        self.output_side_packets = outputs;
        self
    }

    pub fn inputs(&self) -> &PortCollection {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut PortCollection {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &PortCollection {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut PortCollection {
        &mut self.outputs
    }

    pub fn input_side_packets(&self) -> &PortCollection {
        &self.input_side_packets
    }

    pub fn input_side_packets_mut(&mut self) -> &mut PortCollection {
        &mut self.input_side_packets
    }

    pub fn output_side_packets(&self) -> &PortCollection {
        &self.output_side_packets
    }

    pub fn output_side_packets_mut(&mut self) -> &mut PortCollection {
        &mut self.output_side_packets
    }

    /// Every slot typed, and every `SameAs` pointing at an existing input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_typed(&self.inputs, None)?;
        check_typed(&self.input_side_packets, None)?;
        check_typed(&self.outputs, Some(&self.inputs))?;
        check_typed(&self.output_side_packets, Some(&self.input_side_packets))
    }

    /// Exact type an input accepts, if it is pinned to one.
    pub fn input_type(&self, id: &PortId) -> Option<ValueType> {
        exact_type(&self.inputs, None, id)
    }

    /// Exact type an output carries, following `SameAs` to its input.
    pub fn output_type(&self, id: &PortId) -> Option<ValueType> {
        exact_type(&self.outputs, Some(&self.inputs), id)
    }

    pub fn input_side_packet_type(&self, id: &PortId) -> Option<ValueType> {
        exact_type(&self.input_side_packets, None, id)
    }
}

fn check_typed(ports: &PortCollection, sources: Option<&PortCollection>) -> Result<(), ConfigError> {
    for (id, port) in ports.iter() {
        match port.port_type() {
            PortType::Unset => return Err(ConfigError::UnsetPortType { port: id.clone() }),
            PortType::SameAs(target) => {
                if !sources.is_some_and(|s| s.contains(target)) {
                    return Err(ConfigError::DanglingSameAs {
                        port: id.clone(),
                        target: target.clone(),
                    });
                }
            }
            PortType::Any | PortType::Exact(_) => {}
        }
    }
    Ok(())
}

fn exact_type(ports: &PortCollection, sources: Option<&PortCollection>, id: &PortId) -> Option<ValueType> {
    match ports.get(id)?.port_type() {
        PortType::Exact(value_type) => Some(*value_type),
        PortType::SameAs(target) => exact_type(sources?, None, target),
        PortType::Any | PortType::Unset => None,
    }
}
