//! Calendar-field helpers shared by the engine and profile dedup.
//!
//! All instants are stored as UTC. Calendar fields (day, month) are read in a
//! caller-provided fixed-offset zone so results do not depend on host TZ.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeDelta, Utc};

/// Earliest selectable calendar day (inclusive).
pub const MIN_SUPPORTED_DAY: (i32, u32, u32) = (1900, 1, 1);
/// Latest selectable calendar day (inclusive, at midnight).
pub const MAX_SUPPORTED_DAY: (i32, u32, u32) = (2100, 12, 31);

/// Returns the UTC zone as a `FixedOffset`.
pub fn utc_zone() -> FixedOffset {
    Utc.fix()
}

/// Returns the calendar date of `instant` as observed in `zone`.
pub fn calendar_day(instant: DateTime<Utc>, zone: FixedOffset) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

/// Day-granularity equality; time-of-day is ignored.
pub fn is_same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>, zone: FixedOffset) -> bool {
    calendar_day(a, zone) == calendar_day(b, zone)
}

/// Day-of-month (1..=31) in `zone`.
pub fn day_of_month(instant: DateTime<Utc>, zone: FixedOffset) -> u32 {
    instant.with_timezone(&zone).day()
}

/// Month (1..=12) in `zone`.
pub fn month_of_year(instant: DateTime<Utc>, zone: FixedOffset) -> u32 {
    instant.with_timezone(&zone).month()
}

/// Returns `[min, max]` selectable instants: midnight of the first and
/// last supported days in `zone`.
pub fn supported_range(zone: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = |(year, month, day): (i32, u32, u32)| {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .and_then(|naive| naive.and_local_timezone(zone).single())
            .map(|local| local.with_timezone(&Utc))
    };
    (
        midnight(MIN_SUPPORTED_DAY).unwrap_or(DateTime::<Utc>::MIN_UTC),
        midnight(MAX_SUPPORTED_DAY).unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

/// Clamps `instant` into `supported_range(zone)`.
pub fn clamp_to_supported_range(instant: DateTime<Utc>, zone: FixedOffset) -> DateTime<Utc> {
    let (min, max) = supported_range(zone);
    instant.clamp(min, max)
}

/// Moves `instant` by whole days, clamped to the supported range before
/// and after the move. Overflowing offsets land on the nearest bound.
pub fn step_days(instant: DateTime<Utc>, days: i64, zone: FixedOffset) -> DateTime<Utc> {
    let (min, max) = supported_range(zone);
    let base = instant.clamp(min, max);
    let moved = TimeDelta::try_days(days).and_then(|delta| base.checked_add_signed(delta));
    match moved {
        Some(moved) => moved.clamp(min, max),
        None if days > 0 => max,
        None => min,
    }
}
