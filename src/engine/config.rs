use crate::core::{ConfigError, Contract, PortCollection, PortId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON description of one node instance.
///
/// ```json
/// {
///   "type": "PassThroughNode",
///   "inputs": ["VIDEO", "AUDIO"],
///   "options": { "log_tag": "camera" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(rename = "type")]
    pub node_type: String,

    /// Instance name used for metrics; defaults to the node type.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub inputs: Vec<PortId>,

    #[serde(default)]
    pub outputs: Vec<PortId>,

    #[serde(default)]
    pub input_side_packets: Vec<PortId>,

    #[serde(default)]
    pub output_side_packets: Vec<PortId>,

    #[serde(default)]
    pub options: Value,
}

impl NodeConfig {
    pub fn from_json(config: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(config).map_err(ConfigError::Document)
    }

    pub fn instance_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.node_type)
    }

    /// Declared, still untyped, contract.
    pub fn contract(&self) -> Result<Contract, ConfigError> {
        Ok(Contract::new(
            PortCollection::declare(self.inputs.iter().cloned())?,
            PortCollection::declare(self.outputs.iter().cloned())?,
        )
        .with_side_packets(
            PortCollection::declare(self.input_side_packets.iter().cloned())?,
            PortCollection::declare(self.output_side_packets.iter().cloned())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_config() {
        let config = NodeConfig::from_json(json!({
            "type": "PassThroughNode",
            "inputs": ["VIDEO", "0"]
        }))
        .unwrap();

        assert_eq!(config.instance_id(), "PassThroughNode");
        assert_eq!(config.inputs, vec![PortId::tag("VIDEO"), PortId::index(0)]);
        assert!(config.outputs.is_empty());
        assert!(config.options.is_null());
    }

    #[test]
    fn test_missing_type_is_config_error() {
        let result = NodeConfig::from_json(json!({ "inputs": ["A"] }));
        assert!(matches!(result, Err(ConfigError::Document(_))));
    }

    #[test]
    fn test_duplicate_stream_rejected() {
        let config = NodeConfig::from_json(json!({
            "type": "PassThroughNode",
            "inputs": ["A", "A"]
        }))
        .unwrap();
        assert!(matches!(
            config.contract(),
            Err(ConfigError::DuplicatePort { .. })
        ));
    }
}
