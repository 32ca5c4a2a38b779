pub mod context;
pub mod contract;
pub mod error;
pub mod node;
pub mod packet;
pub mod port;
pub mod timestamp;

pub use context::{OpenContext, TickContext};
pub use contract::Contract;
pub use error::{ConfigError, NodeError, RuntimeError};
pub use node::{CalculatorNode, ProcessOutcome};
pub use packet::{Packet, Payload, ValueType};
pub use port::{Port, PortCollection, PortId, PortType};
pub use timestamp::Timestamp;
