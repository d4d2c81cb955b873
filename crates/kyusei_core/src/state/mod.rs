//! In-memory state holders composed by the coordinator.
//!
//! # Responsibility
//! - Hold live profile, settings and location state.
//! - Apply normalization and seeding policy without doing any I/O.
//!
//! # Invariants
//! - Every mutation returns a change report; persistence is decided by the
//!   caller from that report.

pub mod location_state;
pub mod profile_store;
pub mod settings_store;
