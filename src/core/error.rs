use super::{PortId, Timestamp, ValueType};
use thiserror::Error;

/// Failures detected while negotiating a contract or opening a node.
/// Always fatal before the first tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input and output streams must use matching tags and indexes")]
    StreamMismatch,

    #[error("input and output side packets must use matching tags and indexes")]
    SidePacketMismatch,

    #[error("at least one input stream must be declared")]
    NoInputs,

    #[error("required port {port} is not declared")]
    MissingPort { port: PortId },

    #[error("port {port} is not accepted by this node")]
    UnexpectedPort { port: PortId },

    #[error("port {port} is declared more than once")]
    DuplicatePort { port: PortId },

    #[error("port {port} must carry {expected}, declared as {found}")]
    PortType {
        port: PortId,
        expected: ValueType,
        found: ValueType,
    },

    #[error("port {port} was left without a type after negotiation")]
    UnsetPortType { port: PortId },

    #[error("port {port} is bound to the type of {target}, which does not exist")]
    DanglingSameAs { port: PortId, target: PortId },

    #[error("option `{option}` must be non-negative, got {value}")]
    NegativeOption { option: &'static str, value: i64 },

    #[error("option `{option}` must be at most {max}, got {value}")]
    OptionOutOfRange {
        option: &'static str,
        value: i64,
        max: i64,
    },

    #[error("invalid node options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("invalid node config: {0}")]
    Document(#[source] serde_json::Error),

    #[error("side packet {port} is declared but was not supplied")]
    MissingSidePacket { port: PortId },

    #[error("side packet {port} was supplied but not declared")]
    UnknownSidePacket { port: PortId },

    #[error("header for {port} is already set")]
    HeaderAlreadySet { port: PortId },

    #[error("output side packet {port} is already set")]
    SidePacketAlreadySet { port: PortId },

    #[error("unknown node type: {name}")]
    UnknownNodeType { name: String },

    #[error("node type {name} is already registered")]
    DuplicateNodeType { name: String },
}

/// Failures raised while processing a tick. Surfaced to the scheduler,
/// never retried by the node.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    #[error("packet on {port} carries {found}, expected {expected}")]
    TypeMismatch {
        port: PortId,
        expected: ValueType,
        found: ValueType,
    },

    #[error("no port {port} is declared")]
    UnknownPort { port: PortId },

    #[error("port {port} received more than one packet in a single tick")]
    DuplicateInput { port: PortId },

    #[error("tick at {current} does not follow previous tick at {previous}")]
    NonMonotonicTick {
        previous: Timestamp,
        current: Timestamp,
    },

    #[error("{timestamp} is not a valid tick timestamp")]
    ReservedTimestamp { timestamp: Timestamp },

    #[error("packet on {port} at {timestamp} is behind the stream bound {bound}")]
    TimestampBound {
        port: PortId,
        timestamp: Timestamp,
        bound: Timestamp,
    },
}

impl RuntimeError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("cannot {operation} a node in state {state}")]
    Lifecycle {
        operation: &'static str,
        state: &'static str,
    },
}

impl NodeError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }
}
