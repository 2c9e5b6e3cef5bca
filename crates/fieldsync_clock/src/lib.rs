//! # FieldSync Clock
//!
//! Hybrid logical clock (HLC) for FieldSync.
//!
//! This crate provides:
//! - `Hlc` causal timestamps combining physical time, a logical
//!   counter, and a node identity
//! - `HybridClock` for generating timestamps and folding in remote
//!   observations
//! - `NodeId` for stable per-device identity
//!
//! Timestamps serialize as sortable strings
//! (`hex(physical):hex(counter):node`), so lexicographic byte
//! comparison of the serialized form equals causal comparison. This
//! lets storage layers sort timestamps without parsing them.
//!
//! This is a pure logic crate with no I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod error;
mod node;
mod timestamp;

pub use clock::HybridClock;
pub use error::{ClockError, ClockResult};
pub use node::NodeId;
pub use timestamp::Hlc;
