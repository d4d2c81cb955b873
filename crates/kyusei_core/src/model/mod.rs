//! Domain model for board, profile, location and display projections.
//!
//! # Responsibility
//! - Define canonical value types shared by engine, state and persistence.
//! - Keep wire naming (camelCase JSON) stable for persisted snapshots.
//!
//! # Invariants
//! - Every profile is identified by a stable `ProfileId`.
//! - Boards are computed values and are never persisted.

pub mod board;
pub mod calendar;
pub mod location;
pub mod profile;
pub mod settings;
