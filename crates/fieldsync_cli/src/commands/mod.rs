//! CLI command implementations.

pub mod inspect;
pub mod node_id;
pub mod queue;
