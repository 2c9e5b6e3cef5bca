//! # FieldSync Server
//!
//! Server-side merge service for FieldSync.
//!
//! This crate provides:
//! - The [`AuthoritativeStore`] contract with per-record
//!   compare-and-swap semantics
//! - [`MemoryAuthority`], the in-process reference implementation
//! - [`MergeService`], deterministic last-writer-wins resolution of
//!   submitted operation batches
//! - [`MergeServer`], a thin JSON dispatch layer for transports
//!
//! ## Architecture
//!
//! Every incoming operation is resolved independently against the
//! authoritative record it targets, keyed on causal order: a write
//! is applied only when its timestamp is strictly newer than the
//! stored one, otherwise it is discarded wholesale as a conflict.
//! Applying the same operations in any interleaving (respecting each
//! device's own order) converges to the same final state.
//!
//! ## Key invariants
//!
//! - Resolution is per record and per operation; one failing
//!   operation never aborts the rest of its batch
//! - The read-compare-write is closed against concurrent batches by
//!   compare-and-swap on the stored timestamp, not in-process locks
//! - Every resolution is scoped to the submitting organization

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod authority;
mod config;
mod error;
mod merge;
mod server;

pub use authority::{AuthoritativeStore, AuthorityError, AuthorityResult, CasOutcome, MemoryAuthority, RowVersion};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use merge::MergeService;
pub use server::MergeServer;
