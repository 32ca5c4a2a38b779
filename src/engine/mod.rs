pub mod config;
pub mod runner;
pub mod state;

pub use config::NodeConfig;
pub use runner::{NodeRunner, TickOutput};
pub use state::NodeState;
