use crate::core::Timestamp;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Counter, CounterSet};

/// One per-packet record written by the pass-through node.
///
/// Renders as `<log_tag> | <capture_nanos> / <packet ts> / <tick ts>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLine {
    pub log_tag: String,
    /// Wall clock, nanoseconds since the Unix epoch.
    pub capture_nanos: u128,
    pub packet_timestamp: Timestamp,
    pub tick_timestamp: Timestamp,
}

impl DiagnosticLine {
    /// Stamp a line with the current wall clock. A clock before the epoch
    /// records zero.
    pub fn capture(log_tag: &str, packet_timestamp: Timestamp, tick_timestamp: Timestamp) -> Self {
        let capture_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self {
            log_tag: log_tag.to_string(),
            capture_nanos,
            packet_timestamp,
            tick_timestamp,
        }
    }
}

impl fmt::Display for DiagnosticLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} / {} / {}",
            self.log_tag, self.capture_nanos, self.packet_timestamp, self.tick_timestamp
        )
    }
}

/// Destination for diagnostic lines. Implementations must not block.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, line: DiagnosticLine);
}

/// Writes each line as an info event on the calling thread.
///
/// The write happens inside `process`, so with a blocking subscriber
/// writer (the fmt default writes straight to stdout) a slow terminal
/// delays forwarding. Use [`ChannelSink`] with a separate consumer when
/// that matters.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, line: DiagnosticLine) {
        tracing::info!(target: "tickgraph::diagnostics", "{}", line);
    }
}

/// Hands lines to a bounded channel. When the channel is full or the
/// receiver is gone the line is dropped and counted.
pub struct ChannelSink {
    tx: Sender<DiagnosticLine>,
    dropped: AtomicU64,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, Receiver<DiagnosticLine>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl DiagnosticSink for ChannelSink {
    fn emit(&self, line: DiagnosticLine) {
        match self.tx.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(line)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(tag = %line.log_tag, "diagnostic channel full, line dropped");
            }
            Err(TrySendError::Disconnected(line)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(tag = %line.log_tag, "diagnostic receiver gone, line dropped");
            }
        }
    }
}

/// Counter and diagnostic capability handed to nodes through their
/// open and tick contexts.
#[derive(Clone)]
pub struct Diagnostics {
    counters: Arc<CounterSet>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Diagnostics {
    pub fn new(counters: Arc<CounterSet>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { counters, sink }
    }

    pub fn counters(&self) -> &Arc<CounterSet> {
        &self.counters
    }

    pub fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters.get(name)
    }

    pub fn emit(&self, line: DiagnosticLine) {
        self.sink.emit(line);
    }
}

/// Uses a fresh counter set and [`TracingSink`].
impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Arc::new(CounterSet::new()), Arc::new(TracingSink))
    }
}
