//! # FieldSync Store
//!
//! On-device durable storage for FieldSync.
//!
//! This crate provides:
//! - The [`LocalStore`] trait: cached collection copies plus the
//!   pending-operation queue
//! - [`FileStore`], a crash-safe file-backed implementation
//! - [`MemoryStore`], an in-memory twin for tests and ephemeral use
//! - [`NodeIdentity`], the persisted per-device node id
//!
//! ## Durability
//!
//! The file store persists every mutation with a
//! write-temp / sync / rename / directory-fsync sequence, so a crash
//! mid-write leaves either the old or the new value on disk, never a
//! torn document. An advisory lock file keeps the store
//! single-process.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod identity;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use identity::NodeIdentity;
pub use memory::MemoryStore;
pub use store::LocalStore;
