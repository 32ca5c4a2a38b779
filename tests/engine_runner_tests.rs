use async_trait::async_trait;
use serde_json::json;
use tickgraph::core::{
    CalculatorNode, ConfigError, Contract, NodeError, OpenContext, Packet, Payload,
    PortCollection, PortId, ProcessOutcome, RuntimeError, TickContext, Timestamp,
};
use tickgraph::engine::{NodeConfig, NodeRunner, NodeState};
use tickgraph::observability::Diagnostics;
use tickgraph::registry::{register_builtin_nodes, NodeRegistry};

/// Emits a `u32` on "OUT" at the tick timestamp shifted by `shift`.
#[derive(Default)]
struct ShiftNode {
    shift: i64,
    double_header: bool,
    emit_string: bool,
}

#[async_trait]
impl CalculatorNode for ShiftNode {
    fn negotiate(&self, contract: &mut Contract) -> Result<(), ConfigError> {
        for (_, port) in contract.inputs_mut().iter_mut() {
            port.set::<u32>();
        }
        for (_, port) in contract.outputs_mut().iter_mut() {
            port.set::<u32>();
        }
        Ok(())
    }

    async fn open(&mut self, cx: &mut OpenContext<'_>) -> Result<(), NodeError> {
        cx.set_offset(0);
        if self.double_header {
            let out = PortId::tag("OUT");
            cx.set_output_header(&out, Payload::new(1u8))?;
            cx.set_output_header(&out, Payload::new(2u8))?;
        }
        Ok(())
    }

    async fn process(&mut self, cx: &mut TickContext<'_>) -> Result<ProcessOutcome, NodeError> {
        let ts = cx.timestamp().offset(self.shift);
        let packet = if self.emit_string {
            Packet::new(String::from("oops"), ts)
        } else {
            Packet::new(1u32, ts)
        };
        cx.emit(&PortId::tag("OUT"), packet)?;
        Ok(ProcessOutcome::Continue)
    }
}

async fn shift_runner(node: ShiftNode) -> NodeRunner {
    let mut runner = NodeRunner::new("shift", Box::new(node), Diagnostics::default());
    runner
        .negotiate(Contract::declare(["IN"], ["OUT"]).unwrap())
        .unwrap();
    runner
        .open(&json!({}), PortCollection::new(), PortCollection::new())
        .await
        .unwrap();
    runner
}

fn tick(ts: i64) -> [(PortId, Packet); 1] {
    [(PortId::tag("IN"), Packet::new(5u32, Timestamp::new(ts)))]
}

#[tokio::test]
async fn test_process_before_open_rejected() {
    let mut runner = NodeRunner::new("shift", Box::new(ShiftNode::default()), Diagnostics::default());

    let err = runner.process(Timestamp::new(0), tick(0)).await.unwrap_err();
    assert!(matches!(err, NodeError::Lifecycle { operation: "process", state: "Created" }));

    let err = runner
        .open(&json!({}), PortCollection::new(), PortCollection::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Lifecycle { operation: "open", .. }));
    assert_eq!(runner.state(), NodeState::Created);
}

#[tokio::test]
async fn test_negotiate_twice_rejected() {
    let mut runner = shift_runner(ShiftNode::default()).await;
    let err = runner
        .negotiate(Contract::declare(["IN"], ["OUT"]).unwrap())
        .unwrap_err();
    assert!(matches!(err, NodeError::Lifecycle { operation: "negotiate", .. }));
}

#[tokio::test]
async fn test_close_once() {
    let mut runner = shift_runner(ShiftNode::default()).await;
    runner.process(Timestamp::new(0), tick(0)).await.unwrap();

    runner.close().await.unwrap();
    assert_eq!(runner.state(), NodeState::Closed);

    let err = runner.close().await.unwrap_err();
    assert!(matches!(err, NodeError::Lifecycle { operation: "close", state: "Closed" }));
    let err = runner.process(Timestamp::new(1), tick(1)).await.unwrap_err();
    assert!(matches!(err, NodeError::Lifecycle { .. }));
}

#[tokio::test]
async fn test_ticks_must_increase() {
    let mut runner = shift_runner(ShiftNode::default()).await;
    runner.process(Timestamp::new(10), tick(10)).await.unwrap();

    let err = runner.process(Timestamp::new(10), tick(10)).await.unwrap_err();
    assert!(matches!(err, NodeError::Runtime(RuntimeError::NonMonotonicTick { .. })));
    assert_eq!(runner.state(), NodeState::Failed);
}

#[tokio::test]
async fn test_reserved_tick_rejected() {
    let mut runner = shift_runner(ShiftNode::default()).await;
    let err = runner.process(Timestamp::UNSET, tick(0)).await.unwrap_err();
    assert!(matches!(err, NodeError::Runtime(RuntimeError::ReservedTimestamp { .. })));
}

#[tokio::test]
async fn test_unknown_and_duplicate_inputs() {
    let mut runner = shift_runner(ShiftNode::default()).await;
    let ts = Timestamp::new(0);
    let err = runner
        .process(ts, [(PortId::tag("NOPE"), Packet::new(1u32, ts))])
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Runtime(RuntimeError::UnknownPort { .. })));

    let mut runner = shift_runner(ShiftNode::default()).await;
    let err = runner
        .process(
            ts,
            [
                (PortId::tag("IN"), Packet::new(1u32, ts)),
                (PortId::tag("IN"), Packet::new(2u32, ts)),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Runtime(RuntimeError::DuplicateInput { .. })));
}

#[tokio::test]
async fn test_emit_behind_bound_rejected() {
    let mut runner = shift_runner(ShiftNode {
        shift: -1,
        ..Default::default()
    })
    .await;

    let err = runner.process(Timestamp::new(5), tick(5)).await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::Runtime(RuntimeError::TimestampBound { .. })
    ));
}

#[tokio::test]
async fn test_emit_ahead_of_tick_allowed() {
    let mut runner = shift_runner(ShiftNode {
        shift: 3,
        ..Default::default()
    })
    .await;

    let out = runner.process(Timestamp::new(5), tick(5)).await.unwrap();
    assert_eq!(out.packets_on(&PortId::tag("OUT"))[0].timestamp(), Timestamp::new(8));
    assert_eq!(runner.metrics().packets_emitted(), 1);
}

#[tokio::test]
async fn test_emit_wrong_type_rejected() {
    let mut runner = shift_runner(ShiftNode {
        emit_string: true,
        ..Default::default()
    })
    .await;

    let err = runner.process(Timestamp::new(0), tick(0)).await.unwrap_err();
    assert!(matches!(err, NodeError::Runtime(RuntimeError::TypeMismatch { .. })));
}

#[tokio::test]
async fn test_header_is_set_once() {
    let mut runner = NodeRunner::new(
        "shift",
        Box::new(ShiftNode {
            double_header: true,
            ..Default::default()
        }),
        Diagnostics::default(),
    );
    runner
        .negotiate(Contract::declare(["IN"], ["OUT"]).unwrap())
        .unwrap();

    let err = runner
        .open(&json!({}), PortCollection::new(), PortCollection::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Config(ConfigError::HeaderAlreadySet { .. })));
}

#[tokio::test]
async fn test_header_for_undeclared_input_rejected() {
    let mut runner = NodeRunner::new("shift", Box::new(ShiftNode::default()), Diagnostics::default());
    runner
        .negotiate(Contract::declare(["IN"], ["OUT"]).unwrap())
        .unwrap();

    let mut headers = PortCollection::new();
    headers.insert("ELSEWHERE", Payload::new(0u8)).unwrap();
    let err = runner
        .open(&json!({}), headers, PortCollection::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Config(ConfigError::UnexpectedPort { .. })));
}

#[tokio::test]
async fn test_unknown_side_packet_rejected() {
    let mut runner = NodeRunner::new("shift", Box::new(ShiftNode::default()), Diagnostics::default());
    runner
        .negotiate(Contract::declare(["IN"], ["OUT"]).unwrap())
        .unwrap();

    let mut side = PortCollection::new();
    side.insert("EXTRA", Payload::new(0u8)).unwrap();
    let err = runner
        .open(&json!({}), PortCollection::new(), side)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Config(ConfigError::UnknownSidePacket { .. })));
}

#[test]
fn test_unset_port_after_negotiation_rejected() {
    struct Lazy;

    #[async_trait]
    impl CalculatorNode for Lazy {
        fn negotiate(&self, _contract: &mut Contract) -> Result<(), ConfigError> {
            Ok(())
        }

        async fn open(&mut self, _cx: &mut OpenContext<'_>) -> Result<(), NodeError> {
            Ok(())
        }

        async fn process(&mut self, _cx: &mut TickContext<'_>) -> Result<ProcessOutcome, NodeError> {
            Ok(ProcessOutcome::Continue)
        }
    }

    let mut runner = NodeRunner::new("lazy", Box::new(Lazy), Diagnostics::default());
    let err = runner
        .negotiate(Contract::declare(["IN"], Vec::<&str>::new()).unwrap())
        .unwrap_err();
    assert!(matches!(err, NodeError::Config(ConfigError::UnsetPortType { .. })));
}

#[tokio::test]
async fn test_from_config_builds_and_negotiates() {
    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry).unwrap();

    let config = NodeConfig::from_json(json!({
        "type": "PassThroughNode",
        "id": "logger",
        "inputs": ["A", "1"],
        "options": { "log_tag": "cfg" }
    }))
    .unwrap();

    let mut runner = NodeRunner::from_config(&registry, &config, Diagnostics::default()).unwrap();
    assert_eq!(runner.node_id(), "logger");
    assert_eq!(runner.state(), NodeState::Negotiated);
    assert_eq!(runner.contract().outputs().len(), 2);

    runner
        .open(&config.options, PortCollection::new(), PortCollection::new())
        .await
        .unwrap();
    let ts = Timestamp::new(3);
    let out = runner
        .process(ts, [(PortId::index(1), Packet::new(9u16, ts))])
        .await
        .unwrap();
    assert_eq!(out.packets_on(&PortId::index(1)).len(), 1);
}

#[test]
fn test_from_config_unknown_type() {
    let registry = NodeRegistry::new();
    let config = NodeConfig::from_json(json!({ "type": "PassThroughNode", "inputs": ["A"] })).unwrap();

    let err = NodeRunner::from_config(&registry, &config, Diagnostics::default()).err().unwrap();
    assert!(matches!(err, NodeError::Config(ConfigError::UnknownNodeType { .. })));
}
