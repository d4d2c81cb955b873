//! Persistence layer: key-value collaborators and typed state snapshots.
//!
//! # Responsibility
//! - Define the byte-level store contract the core writes into.
//! - Keep JSON encoding and fallback policy out of the coordinator.
//!
//! # Invariants
//! - Typed loads never surface decode errors to callers; defaults apply.
//! - Typed saves are best-effort and never fail the calling mutation.

pub mod kv_store;
pub mod state_repo;
