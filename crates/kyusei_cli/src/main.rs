//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `kyusei_core` linkage.
//! - Print one board for a date/profile so the engine can be eyeballed.

mod cli;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use cli::Cli;
use kyusei_core::{Board, BoardEngine, CoreConfig, Profile, StubBoardEngine};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("kyusei_core ping={}", kyusei_core::ping());
    println!("kyusei_core version={}", kyusei_core::core_version());

    let zone = match CoreConfig::from_env() {
        Ok(config) => config.calendar_zone,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };

    let date = cli
        .date
        .map(|day| midnight_in(day, zone))
        .unwrap_or_else(Utc::now);
    let profile = match cli.birth {
        Some(birth) => Profile::new("cli", midnight_in(birth, zone)),
        None => Profile::anonymous(),
    };

    let board = StubBoardEngine::new(zone).make_board(&profile, date, cli.board_type.into());
    print!("{}", render_board(&board));
    ExitCode::SUCCESS
}

fn midnight_in(day: NaiveDate, zone: FixedOffset) -> DateTime<Utc> {
    // Fixed offsets have no gaps, so the local midnight is always unique.
    day.and_time(NaiveTime::MIN)
        .and_local_timezone(zone)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN).and_utc())
}

fn render_board(board: &Board) -> String {
    let mut out = format!("{} ({})\n", board.kind.title(), board.kind.as_str());
    for row in board.cells.chunks(3) {
        let line = row
            .iter()
            .map(|cell| {
                let markers = cell
                    .markers
                    .iter()
                    .map(|marker| marker.short_label())
                    .collect::<String>();
                format!("{:>2}:{}{}", cell.direction.short_label(), cell.star_number, markers)
            })
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&line);
        out.push('\n');
    }
    let legend = board
        .markers()
        .into_iter()
        .map(|marker| format!("{}={}", marker.short_label(), marker.title()))
        .collect::<Vec<_>>();
    if !legend.is_empty() {
        out.push_str(&legend.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{midnight_in, render_board};
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use kyusei_core::{BoardEngine, BoardType, Profile, StubBoardEngine};

    #[test]
    fn midnight_is_taken_in_the_calendar_zone() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            midnight_in(day, jst),
            Utc.with_ymd_and_hms(2024, 3, 14, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn render_board_prints_three_rows_and_legend() {
        let board = StubBoardEngine::default().make_board(
            &Profile::new("cli", Utc.with_ymd_and_hms(1979, 10, 7, 0, 0, 0).unwrap()),
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            BoardType::Day,
        );
        let rendered = render_board(&board);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "日盤 (day)");
        assert_eq!(lines[1], "NW:3(暗)   N:4(本)  NE:5(五)(破)");
        assert_eq!(lines.len(), 5);
        assert!(lines[4].contains("(吉)=吉方"));
    }
}
