//! Rolling file logs for the core, plus the privacy policy applied to them.
//!
//! # Responsibility
//! - Start one `flexi_logger` file backend per process.
//! - Keep every line metadata-only: `event=… module=… status=…`.
//! - Redact panic payloads before they reach disk.
//!
//! # Invariants
//! - `init_logging` is idempotent for one `(level, log_dir)` pair and
//!   rejects any other pair once active.
//! - Log lines never carry profile names, birth dates or coordinates.
//!   Panic payloads are the one free-text source, so quoted text is dropped
//!   and digits are masked before logging.

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode, TS_DASHES_BLANK_COLONS_DOT_BLANK,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "kyusei";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 3;
const PANIC_SUMMARY_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoggingConfig {
    level: LevelFilter,
    log_dir: PathBuf,
}

impl LoggingConfig {
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level = match level.trim().parse::<LevelFilter>() {
            Ok(LevelFilter::Off) | Err(_) => {
                return Err(format!(
                    "unsupported log level `{}`; expected trace|debug|info|warn|error",
                    level.trim()
                ))
            }
            Ok(level) => level,
        };

        let log_dir = Path::new(log_dir.trim());
        if log_dir.as_os_str().is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        if !log_dir.is_absolute() {
            return Err(format!(
                "log_dir must be an absolute path, got `{}`",
                log_dir.display()
            ));
        }

        Ok(Self {
            level,
            log_dir: log_dir.to_path_buf(),
        })
    }
}

struct ActiveLogger {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn accept(&self, requested: &LoggingConfig) -> Result<(), String> {
        if self.config == *requested {
            return Ok(());
        }
        Err(format!(
            "logging already initialized ({} at `{}`); refusing to switch to {} at `{}`",
            self.config.level,
            self.config.log_dir.display(),
            requested.level,
            requested.log_dir.display()
        ))
    }
}

/// Starts file logging under `log_dir` at `level`.
///
/// `level` is one of `trace|debug|info|warn|error` (case-insensitive);
/// `log_dir` must be absolute.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LoggingConfig::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    active.accept(&requested)
}

/// Active level and directory, when logging has been started.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.config.level, active.config.log_dir.clone()))
}

fn start(config: LoggingConfig) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&config.log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            config.log_dir.display()
        )
    })?;

    let mut spec = LogSpecification::builder();
    spec.default(config.level);
    let handle = Logger::with(spec.build())
        .log_to_file(
            FileSpec::default()
                .directory(&config.log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(line_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={} platform={} version={}",
        config.level,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        config,
        _handle: handle,
    })
}

/// `2024-03-15 09:00:00.123 INFO  [kyusei_core::service::app_state] event=…`
fn line_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record<'_>,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
        record.level(),
        record.module_path().unwrap_or_else(|| record.target()),
        record.args()
    )
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            redact_payload(&payload, PANIC_SUMMARY_LIMIT)
        );
        previous(panic_info);
    }));
}

/// Single-line, privacy-safe summary of free text.
///
/// Quoted spans (how `Debug` prints names) become `"…"`, digits (dates,
/// coordinates) become `#`, line breaks become spaces.
fn redact_payload(text: &str, limit: usize) -> String {
    let mut out = String::with_capacity(text.len().min(limit));
    let mut in_quotes = false;
    for ch in text.chars() {
        match ch {
            '"' if in_quotes => in_quotes = false,
            '"' => {
                in_quotes = true;
                out.push_str("\"…\"");
            }
            _ if in_quotes => {}
            '0'..='9' => out.push('#'),
            '\n' | '\r' => out.push(' '),
            other => out.push(other),
        }
    }

    if out.chars().count() > limit {
        let mut truncated = out.chars().take(limit).collect::<String>();
        truncated.push_str("...");
        return truncated;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{init_logging, line_format, logging_status, redact_payload, LoggingConfig};
    use crate::model::location::AppLocation;
    use crate::model::profile::Profile;
    use chrono::{TimeZone, Utc};
    use flexi_logger::DeferredNow;
    use log::{Level, LevelFilter, Record};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn config_accepts_log_crate_level_names() {
        let config = LoggingConfig::parse(" WARN ", "/var/log/kyusei").unwrap();
        assert_eq!(config.level, LevelFilter::Warn);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/kyusei"));
        assert!(LoggingConfig::parse("off", "/var/log/kyusei").is_err());
        assert!(LoggingConfig::parse("verbose", "/var/log/kyusei").is_err());
    }

    #[test]
    fn config_requires_absolute_log_dir() {
        let error = LoggingConfig::parse("info", "logs/dev").unwrap_err();
        assert!(error.contains("absolute"));
        assert!(LoggingConfig::parse("info", "  ").is_err());
    }

    #[test]
    fn redaction_hides_profile_fields() {
        let birth_date = Utc.with_ymd_and_hms(1979, 10, 7, 0, 0, 0).unwrap();
        let profile = Profile::new("山田 花子", birth_date);
        let redacted = redact_payload(&format!("bad profile {profile:?}"), 10_000);
        assert!(!redacted.contains("山田"), "{redacted}");
        assert!(!redacted.contains("1979"), "{redacted}");
        assert!(redacted.starts_with("bad profile Profile"));
    }

    #[test]
    fn redaction_hides_coordinates_and_location_names() {
        let location = AppLocation::tokyo_station();
        let redacted = redact_payload(&format!("{location:?}\nnext line"), 10_000);
        assert!(!redacted.contains("35.68"), "{redacted}");
        assert!(!redacted.contains("139"), "{redacted}");
        assert!(!redacted.contains("東京駅"), "{redacted}");
        assert!(!redacted.contains('\n'));
        assert!(redacted.contains("latitude: ##.######"), "{redacted}");
    }

    #[test]
    fn redaction_truncates_long_payloads() {
        let redacted = redact_payload(&"x".repeat(20), 8);
        assert_eq!(redacted, "xxxxxxxx...");
        assert_eq!(redact_payload("short", 8), "short");
    }

    #[test]
    fn line_format_writes_level_module_and_message() {
        let mut out = Vec::new();
        line_format(
            &mut out,
            &mut DeferredNow::new(),
            &Record::builder()
                .args(format_args!("event=state_open module=service status=ok"))
                .level(Level::Info)
                .target("kyusei_core")
                .module_path(Some("kyusei_core::service::app_state"))
                .build(),
        )
        .unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(
            line.ends_with(
                " INFO  [kyusei_core::service::app_state] event=state_open module=service status=ok"
            ),
            "{line}"
        );
    }

    fn unique_temp_dir(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "kyusei-logging-{suffix}-{}-{nanos}",
            std::process::id()
        ))
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_other_configs() {
        // The logger outlives this test, so the directory is left in place.
        let log_dir = unique_temp_dir("active");
        let log_dir_str = log_dir.to_string_lossy().into_owned();
        let other_dir_str = unique_temp_dir("other").to_string_lossy().into_owned();

        init_logging("info", &log_dir_str).unwrap();
        init_logging("INFO", &log_dir_str).unwrap();

        let level_error = init_logging("debug", &log_dir_str).unwrap_err();
        assert!(level_error.contains("refusing to switch"));
        let dir_error = init_logging("info", &other_dir_str).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        assert_eq!(logging_status(), Some((LevelFilter::Info, log_dir)));
    }
}
