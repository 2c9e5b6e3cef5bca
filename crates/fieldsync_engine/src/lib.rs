//! # FieldSync Engine
//!
//! Device-side sync coordinator for FieldSync.
//!
//! This crate provides:
//! - [`SyncCoordinator`], the single mediator for every local
//!   mutation: causal stamping, optimistic local apply, durable
//!   queueing and queue draining
//! - [`SyncTransport`] abstraction with a mock and a JSON/HTTP
//!   implementation over a pluggable [`HttpClient`]
//! - Connectivity signalling (`set_online`) that drives retries
//!
//! ## Architecture
//!
//! Mutations never wait for the network. Every mutation is stamped
//! by the device's hybrid logical clock and applied to the local
//! store immediately; online it is written through to the merge
//! service, offline it is queued durably and drained on the next
//! offline-to-online transition. The server is authoritative:
//! acknowledged operations leave the queue whether they applied or
//! lost, and only retryable failures keep them queued.
//!
//! ## Key invariants
//!
//! - A mutation is locally visible before any network attempt
//! - Queued operations survive process restarts (store-backed)
//! - Conflict acknowledgements retire operations; they are never
//!   resubmitted
//! - A sync cycle never runs concurrently with itself

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod http;
mod transport;

pub use config::{ConflictBehavior, SyncConfig};
pub use coordinator::{SyncCoordinator, SyncReport, SyncStats};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, JsonTransport, LoopbackClient, LoopbackServer, SUBMIT_PATH};
pub use transport::{MockTransport, SyncTransport};
