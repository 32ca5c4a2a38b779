use tickgraph::core::{ConfigError, Contract, PortId};
use tickgraph::nodes::{BroadcastNode, PassThroughNode};
use tickgraph::registry::{register_builtin_nodes, NodeRegistry, NodeType};

#[test]
fn test_registry_starts_empty() {
    let registry = NodeRegistry::new();
    assert!(registry.list().is_empty());
    assert!(!registry.contains("PassThroughNode"));
}

#[test]
fn test_builtin_registration() {
    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry).unwrap();

    let names: Vec<&str> = registry.list().iter().map(|m| m.type_name.as_str()).collect();
    assert_eq!(names, vec!["BroadcastNode", "PassThroughNode"]);
    assert!(registry.contains("PassThroughNode"));
    assert_eq!(registry.get("BroadcastNode").unwrap().name, "Broadcast");
    assert!(registry.get("Missing").is_none());
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut registry = NodeRegistry::new();
    registry.register::<PassThroughNode>().unwrap();

    let err = registry.register::<PassThroughNode>().unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateNodeType { ref name } if name == "PassThroughNode"));
}

#[test]
fn test_unknown_type() {
    let registry = NodeRegistry::new();
    let err = registry.create("Nope").err().unwrap();
    assert!(matches!(err, ConfigError::UnknownNodeType { .. }));
}

#[test]
fn test_broadcast_metadata() {
    let meta = BroadcastNode::metadata();

    assert_eq!(meta.name, "Broadcast");
    assert_eq!(meta.category, "Utilities");
    assert_eq!(meta.inputs.len(), 1);
    assert_eq!(meta.inputs[0].tag, "INPUT_ITERABLE");
    assert_eq!(meta.outputs[0].tag, "OUTPUT_ITERABLE");

    let count = meta
        .parameters
        .iter()
        .find(|p| p.name == "replication_count")
        .expect("replication_count parameter not found");
    assert_eq!(count.param_type, "integer");
    assert_eq!(count.default, serde_json::json!(0));
    assert_eq!(count.min, Some(0.0));
    assert_eq!(count.max, Some(i32::MAX as f64));
}

#[test]
fn test_pass_through_metadata() {
    let meta = PassThroughNode::metadata();

    assert!(meta.inputs.is_empty());
    let tag = meta.parameters.iter().find(|p| p.name == "log_tag").unwrap();
    assert_eq!(tag.param_type, "string");
    assert_eq!(tag.default, serde_json::json!(""));
}

#[test]
fn test_factory_creates_working_instance() {
    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry).unwrap();

    let node = registry.create("BroadcastNode").unwrap();
    let mut contract = Contract::declare(["INPUT_ITERABLE"], ["OUTPUT_ITERABLE"]).unwrap();
    node.negotiate(&mut contract).unwrap();

    assert!(contract
        .input_type(&PortId::tag("INPUT_ITERABLE"))
        .is_some());
}
