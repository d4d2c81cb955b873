//! Placeholder arithmetic board engine.
//!
//! This is not an astrological computation. It is a deterministic transform
//! over calendar fields that gives the UI realistic-looking boards until a
//! real implementation is plugged in behind `BoardEngine`.
//!
//! # Invariants
//! - Base index is derived from (day, month) of `date` and the day of
//!   `profile.birth_date`, all read in the engine's calendar zone.
//! - Star number at canonical index `i` is `((base + i) mod 9) + 1`.
//! - Markers depend only on the star number.

use super::BoardEngine;
use crate::model::board::{Board, BoardCell, BoardType, Direction, Marker};
use crate::model::calendar::{day_of_month, month_of_year, utc_zone};
use crate::model::profile::Profile;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeSet;

/// Deterministic placeholder engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubBoardEngine {
    zone: FixedOffset,
}

impl StubBoardEngine {
    /// Creates an engine reading calendar fields in `zone`.
    pub fn new(zone: FixedOffset) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    fn base_index(&self, profile: &Profile, date: DateTime<Utc>, board_type: BoardType) -> u32 {
        let day = day_of_month(date, self.zone);
        let month = month_of_year(date, self.zone);
        let birth_day = day_of_month(profile.birth_date, self.zone);

        match board_type {
            BoardType::Year => (month + birth_day) % 9,
            BoardType::Month => (day + birth_day + 2) % 9,
            BoardType::Day => (day + month + birth_day + 4) % 9,
        }
    }
}

impl Default for StubBoardEngine {
    fn default() -> Self {
        Self::new(utc_zone())
    }
}

impl BoardEngine for StubBoardEngine {
    fn make_board(&self, profile: &Profile, date: DateTime<Utc>, board_type: BoardType) -> Board {
        let base = self.base_index(profile, date, board_type);

        let cells = Direction::ALL
            .iter()
            .enumerate()
            .map(|(index, &direction)| {
                // index < 9 and base < 9, so the sum fits and the result is 1..=9.
                let star_number = ((base + index as u32) % 9 + 1) as u8;
                BoardCell {
                    direction,
                    star_number,
                    labels: vec![
                        direction.short_label().to_string(),
                        board_type.title().to_string(),
                    ],
                    markers: markers_for_star(star_number),
                }
            })
            .collect::<Vec<_>>();

        let center = cells
            .iter()
            .find(|cell| cell.direction == Direction::Center)
            .cloned()
            .unwrap_or_else(|| cells[4].clone());

        Board {
            kind: board_type,
            cells,
            center,
            generated_at: date,
        }
    }
}

/// Fixed marker lookup keyed by star number.
pub fn markers_for_star(star_number: u8) -> BTreeSet<Marker> {
    let markers: &[Marker] = match star_number {
        1 | 6 | 8 => &[Marker::Good],
        5 => &[Marker::Go, Marker::Ha],
        2 => &[Marker::Teki],
        3 => &[Marker::An],
        4 => &[Marker::Hon],
        _ => &[],
    };
    markers.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::{markers_for_star, StubBoardEngine};
    use crate::engine::BoardEngine;
    use crate::model::board::{BoardType, Direction, Marker};
    use crate::model::profile::Profile;
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn profile_born_on_day(day: u32) -> Profile {
        Profile::new("test", Utc.with_ymd_and_hms(1990, 5, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn day_board_matches_worked_example() {
        let engine = StubBoardEngine::default();
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let board = engine.make_board(&profile_born_on_day(7), date, BoardType::Day);

        // (15 + 3 + 7 + 4) mod 9 = 2
        let nw = board.cell(Direction::NorthWest).unwrap();
        assert_eq!(nw.star_number, 3);
        assert_eq!(nw.markers, BTreeSet::from([Marker::An]));
        assert_eq!(board.center.star_number, 7);
        assert!(board.center.markers.is_empty());
    }

    #[test]
    fn year_and_month_boards_use_their_own_offsets() {
        let engine = StubBoardEngine::default();
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let profile = profile_born_on_day(7);

        // year: (3 + 7) mod 9 = 1 -> NW star 2
        let year = engine.make_board(&profile, date, BoardType::Year);
        assert_eq!(year.cells[0].star_number, 2);
        // month: (15 + 7 + 2) mod 9 = 6 -> NW star 7
        let month = engine.make_board(&profile, date, BoardType::Month);
        assert_eq!(month.cells[0].star_number, 7);
    }

    #[test]
    fn labels_carry_direction_and_board_title() {
        let engine = StubBoardEngine::default();
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let board = engine.make_board(&Profile::anonymous(), date, BoardType::Month);

        assert_eq!(board.cells[0].labels, vec!["NW".to_string(), "月盤".to_string()]);
        assert_eq!(board.center.labels, vec!["C".to_string(), "月盤".to_string()]);
        assert_eq!(board.generated_at, date);
    }

    #[test]
    fn calendar_zone_shifts_day_boundaries() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let utc_engine = StubBoardEngine::default();
        let jst_engine = StubBoardEngine::new(jst);
        // 2024-03-14T20:00Z is March 15th in Tokyo.
        let date = Utc.with_ymd_and_hms(2024, 3, 14, 20, 0, 0).unwrap();
        let profile = Profile::with_id(
            uuid::Uuid::new_v4(),
            "",
            Utc.with_ymd_and_hms(1990, 5, 7, 3, 0, 0).unwrap(),
            Utc::now(),
        );

        let utc_board = utc_engine.make_board(&profile, date, BoardType::Day);
        let jst_board = jst_engine.make_board(&profile, date, BoardType::Day);
        assert_eq!(utc_board.cells[0].star_number, 2);
        assert_eq!(jst_board.cells[0].star_number, 3);
    }

    #[test]
    fn marker_table_is_fixed() {
        assert_eq!(markers_for_star(1), BTreeSet::from([Marker::Good]));
        assert_eq!(markers_for_star(2), BTreeSet::from([Marker::Teki]));
        assert_eq!(markers_for_star(3), BTreeSet::from([Marker::An]));
        assert_eq!(markers_for_star(4), BTreeSet::from([Marker::Hon]));
        assert_eq!(markers_for_star(5), BTreeSet::from([Marker::Go, Marker::Ha]));
        assert_eq!(markers_for_star(6), BTreeSet::from([Marker::Good]));
        assert!(markers_for_star(7).is_empty());
        assert_eq!(markers_for_star(8), BTreeSet::from([Marker::Good]));
        assert!(markers_for_star(9).is_empty());
    }
}
