use crate::core::CalculatorNode;
use serde::{Deserialize, Serialize};

/// Metadata describing a fixed port. Nodes with caller-chosen ports
/// (such as the pass-through node) declare none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortMetadata {
    pub tag: String,
    pub data_type: String,
}

/// Schema for a configurable option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub default: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Factory function type for creating node instances
pub type NodeFactory = fn() -> Box<dyn CalculatorNode>;

/// Complete metadata for a node type
#[derive(Clone)]
pub struct NodeMetadata {
    /// Registry key; the Rust type name.
    pub type_name: String,
    pub name: String,
    pub category: String,
    pub inputs: Vec<PortMetadata>,
    pub outputs: Vec<PortMetadata>,
    pub parameters: Vec<ParameterSchema>,
    pub factory: NodeFactory,
}

impl NodeMetadata {
    /// Create a new instance of this node type
    pub fn create_instance(&self) -> Box<dyn CalculatorNode> {
        (self.factory)()
    }
}

impl std::fmt::Debug for NodeMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeMetadata")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Implemented by `#[derive(NodeType)]`.
pub trait NodeType {
    fn metadata() -> NodeMetadata;
}
