//! Runtime configuration for core consumers (FFI, CLI).
//!
//! # Responsibility
//! - Resolve the state store location and calendar zone from environment.
//! - Reject malformed values instead of silently guessing.
//!
//! # Invariants
//! - Defaults apply only when a variable is unset or blank.

use chrono::FixedOffset;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Overrides the state store file path.
pub const DB_PATH_ENV: &str = "KYUSEI_DB_PATH";
/// Calendar zone offset from UTC in minutes (e.g. `540` for Japan).
pub const UTC_OFFSET_ENV: &str = "KYUSEI_UTC_OFFSET_MINUTES";

const DEFAULT_DB_FILE_NAME: &str = "kyusei_state.sqlite3";
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 9 * 60;
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Configuration parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidUtcOffset(String),
    UtcOffsetOutOfRange(i32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUtcOffset(raw) => {
                write!(f, "{UTC_OFFSET_ENV} must be an integer, got `{raw}`")
            }
            Self::UtcOffsetOutOfRange(minutes) => write!(
                f,
                "{UTC_OFFSET_ENV} must be within ±{MAX_UTC_OFFSET_MINUTES} minutes, got {minutes}"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub calendar_zone: FixedOffset,
}

impl CoreConfig {
    /// Resolves configuration from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup` (injectable for tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = non_blank(lookup(DB_PATH_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let offset_minutes = match non_blank(lookup(UTC_OFFSET_ENV)) {
            Some(raw) => parse_offset_minutes(&raw)?,
            None => DEFAULT_UTC_OFFSET_MINUTES,
        };

        Ok(Self {
            db_path,
            calendar_zone: zone_from_minutes(offset_minutes)?,
        })
    }
}

/// Default store file under the OS temp directory.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

/// Builds a fixed-offset zone from whole minutes east of UTC.
pub fn zone_from_minutes(minutes: i32) -> Result<FixedOffset, ConfigError> {
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(ConfigError::UtcOffsetOutOfRange(minutes));
    }
    FixedOffset::east_opt(minutes * 60).ok_or(ConfigError::UtcOffsetOutOfRange(minutes))
}

fn parse_offset_minutes(raw: &str) -> Result<i32, ConfigError> {
    raw.parse::<i32>()
        .map_err(|_| ConfigError::InvalidUtcOffset(raw.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{default_db_path, ConfigError, CoreConfig, DB_PATH_ENV, UTC_OFFSET_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = CoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "  ")]))
            .expect("defaults should resolve");
        assert_eq!(config.db_path, default_db_path());
        assert_eq!(config.calendar_zone.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, "/data/kyusei.sqlite3"),
            (UTC_OFFSET_ENV, " -300 "),
        ]))
        .expect("explicit values should resolve");
        assert_eq!(config.db_path, PathBuf::from("/data/kyusei.sqlite3"));
        assert_eq!(config.calendar_zone.local_minus_utc(), -300 * 60);
    }

    #[test]
    fn malformed_offsets_are_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(UTC_OFFSET_ENV, "+9h")]))
            .expect_err("non-integer offset must fail");
        assert_eq!(err, ConfigError::InvalidUtcOffset("+9h".to_string()));

        let err = CoreConfig::from_lookup(lookup_from(&[(UTC_OFFSET_ENV, "2000")]))
            .expect_err("out-of-range offset must fail");
        assert_eq!(err, ConfigError::UtcOffsetOutOfRange(2000));
    }
}
