pub mod metadata;

pub use metadata::{NodeFactory, NodeMetadata, NodeType, ParameterSchema, PortMetadata};

use crate::core::{CalculatorNode, ConfigError};
use crate::nodes::{BroadcastNode, PassThroughNode};
use std::collections::BTreeMap;

/// Node types available to graph configs, keyed by type name.
///
/// Starts empty. Types are added by explicit `register` calls at startup,
/// usually through [`register_builtin_nodes`].
#[derive(Debug, Default)]
pub struct NodeRegistry {
    types: BTreeMap<String, NodeMetadata>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    pub fn register<T: NodeType>(&mut self) -> Result<(), ConfigError> {
        self.register_metadata(T::metadata())
    }

    pub fn register_metadata(&mut self, metadata: NodeMetadata) -> Result<(), ConfigError> {
        if self.types.contains_key(&metadata.type_name) {
            return Err(ConfigError::DuplicateNodeType {
                name: metadata.type_name,
            });
        }
        tracing::debug!(node_type = %metadata.type_name, "registered node type");
        self.types.insert(metadata.type_name.clone(), metadata);
        Ok(())
    }

    pub fn create(&self, type_name: &str) -> Result<Box<dyn CalculatorNode>, ConfigError> {
        self.types
            .get(type_name)
            .map(|metadata| metadata.create_instance())
            .ok_or_else(|| ConfigError::UnknownNodeType {
                name: type_name.to_string(),
            })
    }

    pub fn get(&self, type_name: &str) -> Option<&NodeMetadata> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// All registered types, sorted by type name.
    pub fn list(&self) -> Vec<&NodeMetadata> {
        self.types.values().collect()
    }
}

/// Register every node type shipped with this crate.
pub fn register_builtin_nodes(registry: &mut NodeRegistry) -> Result<(), ConfigError> {
    registry.register::<PassThroughNode>()?;
    registry.register::<BroadcastNode>()?;
    Ok(())
}
