use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use kyusei_core::{
    markers_for_star, BoardEngine, BoardType, Direction, Marker, Profile, StubBoardEngine,
};
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

fn sample_profiles() -> Vec<Profile> {
    (1..=31)
        .step_by(3)
        .map(|day| {
            Profile::with_id(
                Uuid::new_v4(),
                format!("born-{day}"),
                Utc.with_ymd_and_hms(1984, 1, day, 6, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )
        })
        .chain(std::iter::once(Profile::anonymous()))
        .collect()
}

fn sample_dates() -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2023, 12, 20, 23, 30, 0).unwrap();
    (0..400).step_by(7).map(|offset| start + Duration::days(offset)).collect()
}

fn engines() -> Vec<StubBoardEngine> {
    vec![
        StubBoardEngine::default(),
        StubBoardEngine::new(FixedOffset::east_opt(9 * 3600).unwrap()),
    ]
}

#[test]
fn boards_are_deterministic() {
    for engine in engines() {
        for profile in sample_profiles() {
            for date in sample_dates() {
                for board_type in BoardType::ALL {
                    let first = engine.make_board(&profile, date, board_type);
                    let second = engine.make_board(&profile, date, board_type);
                    assert_eq!(first, second);
                }
            }
        }
    }
}

#[test]
fn boards_cover_every_direction_once_with_valid_center_and_range() {
    let engine = StubBoardEngine::default();
    for profile in sample_profiles() {
        for date in sample_dates() {
            for board_type in BoardType::ALL {
                let board = engine.make_board(&profile, date, board_type);

                let directions = board.cells.iter().map(|c| c.direction).collect::<Vec<_>>();
                assert_eq!(directions, Direction::ALL.to_vec());
                let unique = directions.iter().collect::<HashSet<_>>();
                assert_eq!(unique.len(), 9);

                assert_eq!(Some(&board.center), board.cell(Direction::Center));
                assert_eq!(board.kind, board_type);

                for cell in &board.cells {
                    assert!((1..=9).contains(&cell.star_number), "{cell:?}");
                    assert_eq!(cell.markers, markers_for_star(cell.star_number));
                }

                // Nine consecutive offsets mod 9 visit every star exactly once.
                let stars = board.cells.iter().map(|c| c.star_number).collect::<BTreeSet<_>>();
                assert_eq!(stars.len(), 9);
            }
        }
    }
}

#[test]
fn marker_table_matches_star_numbers_exactly() {
    let engine = StubBoardEngine::default();
    let board = engine.make_board(
        &Profile::anonymous(),
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        BoardType::Day,
    );

    for cell in &board.cells {
        let expected: BTreeSet<Marker> = match cell.star_number {
            1 | 6 | 8 => [Marker::Good].into(),
            5 => [Marker::Go, Marker::Ha].into(),
            2 => [Marker::Teki].into(),
            3 => [Marker::An].into(),
            4 => [Marker::Hon].into(),
            _ => BTreeSet::new(),
        };
        assert_eq!(cell.markers, expected, "star {}", cell.star_number);
    }
    assert_eq!(board.markers().len(), Marker::ALL.len());
}

#[test]
fn worked_example_day_board() {
    let engine = StubBoardEngine::default();
    let profile = Profile::with_id(
        Uuid::new_v4(),
        "example",
        Utc.with_ymd_and_hms(1979, 10, 7, 0, 0, 0).unwrap(),
        Utc::now(),
    );
    let board = engine.make_board(
        &profile,
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        BoardType::Day,
    );

    let stars = board.cells.iter().map(|c| c.star_number).collect::<Vec<_>>();
    assert_eq!(stars, vec![3, 4, 5, 6, 7, 8, 9, 1, 2]);
    assert_eq!(board.cells[0].markers, BTreeSet::from([Marker::An]));
    assert_eq!(board.center.direction, Direction::Center);
    assert_eq!(board.center.star_number, 7);
    assert!(board.center.markers.is_empty());
    assert_eq!(board.cells[0].labels, vec!["NW".to_string(), "日盤".to_string()]);
}

#[test]
fn engine_is_usable_through_trait_objects() {
    let engine: Box<dyn BoardEngine> = Box::new(StubBoardEngine::default());
    let date = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let via_box = engine.make_board(&Profile::anonymous(), date, BoardType::Month);
    let direct =
        StubBoardEngine::default().make_board(&Profile::anonymous(), date, BoardType::Month);
    assert_eq!(via_box, direct);
}
