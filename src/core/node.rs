use super::{ConfigError, Contract, NodeError, OpenContext, TickContext};
use async_trait::async_trait;

/// Result of a successful tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Continue,
    /// Nothing left to do; the node asks the scheduler to retire it.
    Stop,
}

/// Base trait for all nodes in a graph.
///
/// A scheduler drives one instance strictly sequentially:
/// `negotiate`, `open`, any number of `process` calls, then `close`.
#[async_trait]
pub trait CalculatorNode: Send + Sync {
    /// Claim and type the declared ports. Runs once, before any data.
    fn negotiate(&self, contract: &mut Contract) -> Result<(), ConfigError>;

    /// Read options and propagate headers / side packets.
    async fn open(&mut self, cx: &mut OpenContext<'_>) -> Result<(), NodeError>;

    /// Handle one tick.
    async fn process(&mut self, cx: &mut TickContext<'_>) -> Result<ProcessOutcome, NodeError>;

    async fn close(&mut self) -> Result<(), NodeError> {
        Ok(())
    }
}
