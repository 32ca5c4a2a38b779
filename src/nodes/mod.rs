pub mod broadcast;
pub mod pass_through;

pub use broadcast::{
    BroadcastNode, RectList, INPUT_ITERABLE, MAX_REPLICATION_COUNT, OUTPUT_ITERABLE,
};
pub use pass_through::{PassThroughNode, PASS_THROUGH_COUNTER};
