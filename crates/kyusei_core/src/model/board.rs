//! Board value types: board type, directions, markers and cells.
//!
//! # Responsibility
//! - Define the computed 3×3 board shape returned by `BoardEngine`.
//! - Provide stable display labels for directions, board types and markers.
//!
//! # Invariants
//! - `Board::cells` holds exactly one cell per `Direction`, in
//!   `Direction::ALL` order.
//! - `Board::center` equals the cell at `Direction::Center`.
//! - `BoardCell::star_number` is in `1..=9`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Calendar granularity selecting which fields the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardType {
    Year,
    Month,
    Day,
}

impl BoardType {
    pub const ALL: [BoardType; 3] = [Self::Year, Self::Month, Self::Day];

    /// Stable wire id (`year|month|day`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }

    /// Display title used as the second cell label.
    pub fn title(self) -> &'static str {
        match self {
            Self::Year => "年盤",
            Self::Month => "月盤",
            Self::Day => "日盤",
        }
    }

    /// Parses a wire id, case-insensitive and trimmed.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            _ => None,
        }
    }
}

/// One of the nine board positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    /// Canonical order; the engine assigns star offsets by index in this list.
    pub const ALL: [Direction; 9] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::West,
        Self::Center,
        Self::East,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    pub fn short_label(self) -> &'static str {
        match self {
            Self::NorthWest => "NW",
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::West => "W",
            Self::Center => "C",
            Self::East => "E",
            Self::SouthWest => "SW",
            Self::South => "S",
            Self::SouthEast => "SE",
        }
    }
}

/// Symbolic annotation attached to a cell by star number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Good,
    Go,
    An,
    Hon,
    Teki,
    Ha,
}

impl Marker {
    pub const ALL: [Marker; 6] = [
        Self::Good,
        Self::Go,
        Self::An,
        Self::Hon,
        Self::Teki,
        Self::Ha,
    ];

    /// Stable wire id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Go => "go",
            Self::An => "an",
            Self::Hon => "hon",
            Self::Teki => "teki",
            Self::Ha => "ha",
        }
    }

    /// Short glyph shown inside a board cell.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Good => "(吉)",
            Self::Go => "(五)",
            Self::An => "(暗)",
            Self::Hon => "(本)",
            Self::Teki => "(的)",
            Self::Ha => "(破)",
        }
    }

    /// Long title shown in the legend.
    pub fn title(self) -> &'static str {
        match self {
            Self::Good => "吉方",
            Self::Go => "五黄殺",
            Self::An => "暗剣殺",
            Self::Hon => "本命殺",
            Self::Teki => "本命的殺",
            Self::Ha => "歳破",
        }
    }
}

/// One directional cell of a computed board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCell {
    pub direction: Direction,
    /// Always in `1..=9`.
    pub star_number: u8,
    pub labels: Vec<String>,
    pub markers: BTreeSet<Marker>,
}

/// Computed 3×3 board. Recomputed on every read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(rename = "type")]
    pub kind: BoardType,
    pub cells: Vec<BoardCell>,
    pub center: BoardCell,
    pub generated_at: DateTime<Utc>,
}

impl Board {
    /// Returns the cell at `direction`, if present.
    pub fn cell(&self, direction: Direction) -> Option<&BoardCell> {
        self.cells.iter().find(|cell| cell.direction == direction)
    }

    /// Union of all markers on the board, in declaration order.
    ///
    /// Feeds legend rendering, which lists each marker once.
    pub fn markers(&self) -> BTreeSet<Marker> {
        self.cells
            .iter()
            .flat_map(|cell| cell.markers.iter().copied())
            .collect()
    }
}
