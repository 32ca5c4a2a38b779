pub mod core;
pub mod engine;
pub mod formats;
pub mod nodes;
pub mod observability;
pub mod registry;
