//! CLI argument definitions for the board smoke CLI.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use kyusei_core::BoardType;

#[derive(Debug, Parser)]
#[command(
    name = "kyusei_cli",
    version,
    about = "Print a Kyusei board for a date and birth profile"
)]
pub struct Cli {
    /// Board granularity.
    #[arg(long = "type", short = 't', value_enum, default_value = "day")]
    pub board_type: BoardTypeArg,

    /// Board date as YYYY-MM-DD (default: today).
    #[arg(value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Birth date of the profile as YYYY-MM-DD (default: anonymous profile).
    #[arg(long = "birth", value_name = "YYYY-MM-DD")]
    pub birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoardTypeArg {
    Year,
    Month,
    Day,
}

impl From<BoardTypeArg> for BoardType {
    fn from(value: BoardTypeArg) -> Self {
        match value {
            BoardTypeArg::Year => BoardType::Year,
            BoardTypeArg::Month => BoardType::Month,
            BoardTypeArg::Day => BoardType::Day,
        }
    }
}
