//! # FieldSync Protocol
//!
//! Sync protocol types and wire codecs for FieldSync.
//!
//! This crate provides:
//! - `Record` envelopes synced at whole-record granularity
//! - `PendingOperation` for queued mutations
//! - `SyncOutcome` for per-operation merge results
//! - Submit messages (`SubmitRequest` / `SubmitResponse`)
//! - The closed set of known [`Collection`]s
//!
//! The wire format is JSON via serde. Unknown collection names are
//! rejected at the boundary when converting a [`WireOperation`] into
//! a typed [`PendingOperation`]; that rejection is permanent, never
//! retried.
//!
//! This is a pure protocol crate with no I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod error;
mod messages;
mod operation;
mod outcome;
mod record;

pub use collection::Collection;
pub use error::{MalformedOperation, ProtocolError, ProtocolResult};
pub use messages::{SubmitRequest, SubmitResponse};
pub use operation::{PendingOperation, SyncAction, WireOperation};
pub use outcome::{RejectReason, SyncOutcome};
pub use record::Record;
