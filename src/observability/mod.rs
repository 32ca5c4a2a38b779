pub mod metrics;
pub mod collector;
pub mod counters;
pub mod diagnostics;
pub mod monitor;

pub use metrics::NodeMetrics;
pub use collector::{MetricsCollector, MetricsSnapshot};
pub use counters::{Counter, CounterSet};
pub use diagnostics::{ChannelSink, DiagnosticLine, DiagnosticSink, Diagnostics, TracingSink};
pub use monitor::GraphMonitor;
