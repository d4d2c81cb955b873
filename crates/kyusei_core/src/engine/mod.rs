//! Board computation engine contracts.
//!
//! # Responsibility
//! - Define the single capability the coordinator needs from an engine.
//! - Keep board arithmetic swappable without touching state management.
//!
//! # Invariants
//! - Implementations are pure, total and deterministic: identical inputs
//!   yield identical boards.
//! - Returned boards satisfy the shape invariants of `model::board`.

use crate::model::board::{Board, BoardType};
use crate::model::profile::Profile;
use chrono::{DateTime, Utc};

pub mod stub;

pub use stub::{markers_for_star, StubBoardEngine};

/// Capability that maps `profile × date × board type` to a board.
pub trait BoardEngine {
    fn make_board(&self, profile: &Profile, date: DateTime<Utc>, board_type: BoardType) -> Board;
}

impl<E: BoardEngine + ?Sized> BoardEngine for &E {
    fn make_board(&self, profile: &Profile, date: DateTime<Utc>, board_type: BoardType) -> Board {
        (**self).make_board(profile, date, board_type)
    }
}

impl<E: BoardEngine + ?Sized> BoardEngine for Box<E> {
    fn make_board(&self, profile: &Profile, date: DateTime<Utc>, board_type: BoardType) -> Board {
        (**self).make_board(profile, date, board_type)
    }
}
