//! Core use-case services.
//!
//! # Responsibility
//! - Compose state holders, engine and persistence into one coordinator.
//! - Marshal background location events onto the coordinator thread.

pub mod app_state;
pub mod location_feed;
