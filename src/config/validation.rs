//! Configuration validation.
//!
//! Turns a merged [`FlipclockConfig`] into [`CountdownSettings`], parsing
//! the target and durations along the way. Every problem is collected
//! rather than stopping at the first one.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::config::schema::{
    CountdownSettings, DEFAULT_FLIP_SETTLE_DELAY, DEFAULT_FLIP_TEXT_DELAY, DEFAULT_TARGET,
    DEFAULT_TICK, FlipclockConfig, TimeZoneChoice,
};
use crate::countdown::{FlipTiming, Motion};
use crate::error::{Severity, ValidationIssue};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Outcome of validating one configuration.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Problems that prevent the configuration from being used.
    pub errors: Vec<ValidationIssue>,
    /// Problems worth reporting.
    pub warnings: Vec<ValidationIssue>,
    /// Resolved settings, present when there are no errors.
    pub settings: Option<CountdownSettings>,
}

impl ValidationResult {
    /// Returns `true` if there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config`, using `now_ms` to judge whether the target has
    /// already passed.
    pub fn validate(&mut self, config: &FlipclockConfig, now_ms: i64) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        let section = &config.countdown;

        let raw_target = section.target.as_deref().unwrap_or(DEFAULT_TARGET);
        let target_ms = match parse_target(raw_target, section.timezone) {
            Ok(ms) => {
                if ms < now_ms {
                    self.warn(
                        "countdown.target",
                        format!("'{raw_target}' is already in the past; the arrival message will show immediately"),
                    );
                }
                Some(ms)
            }
            Err(message) => {
                self.error("countdown.target", message);
                None
            }
        };

        let tick = self.duration("countdown.tick", section.tick.as_deref(), DEFAULT_TICK);
        let text_delay = self.duration(
            "countdown.flip_text_delay",
            section.flip_text_delay.as_deref(),
            DEFAULT_FLIP_TEXT_DELAY,
        );
        let settle_delay = self.duration(
            "countdown.flip_settle_delay",
            section.flip_settle_delay.as_deref(),
            DEFAULT_FLIP_SETTLE_DELAY,
        );

        if tick == Some(Duration::ZERO) {
            self.error("countdown.tick", "must be greater than zero".to_string());
        }
        if let (Some(text), Some(settle)) = (text_delay, settle_delay)
            && text > settle
        {
            self.error(
                "countdown.flip_text_delay",
                format!(
                    "text delay ({}) must not exceed settle delay ({})",
                    humantime::format_duration(text),
                    humantime::format_duration(settle)
                ),
            );
        }
        if let (Some(tick), Some(settle)) = (tick, settle_delay)
            && tick > Duration::ZERO
            && settle >= tick
        {
            self.warn(
                "countdown.flip_settle_delay",
                format!(
                    "settle delay ({}) is not shorter than the tick ({}); consecutive flips will overlap",
                    humantime::format_duration(settle),
                    humantime::format_duration(tick)
                ),
            );
        }

        if config.arrival.title.trim().is_empty() {
            self.error("arrival.title", "must not be empty".to_string());
        }

        let settings = match (target_ms, tick, text_delay, settle_delay) {
            (Some(target_ms), Some(tick_interval), Some(text_delay), Some(settle_delay))
                if self.errors.is_empty() =>
            {
                let motion = if section.reduced_motion.unwrap_or(false) {
                    Motion::Reduced
                } else {
                    Motion::Full
                };
                Some(CountdownSettings {
                    target_ms,
                    timing: FlipTiming {
                        tick_interval,
                        text_delay,
                        settle_delay,
                        motion,
                    },
                    arrival: config.arrival.clone(),
                    labels: config.display.labels.clone(),
                })
            }
            _ => None,
        };

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
            settings,
        }
    }

    fn duration(&mut self, path: &str, raw: Option<&str>, default: &str) -> Option<Duration> {
        let raw = raw.unwrap_or(default);
        match humantime::parse_duration(raw.trim()) {
            Ok(duration) => Some(duration),
            Err(e) => {
                self.error(path, format!("invalid duration '{raw}': {e}"));
                None
            }
        }
    }

    fn error(&mut self, path: &str, message: String) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message,
            severity: Severity::Error,
        });
    }

    fn warn(&mut self, path: &str, message: String) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message,
            severity: Severity::Warning,
        });
    }
}

/// Parses a countdown target into epoch milliseconds.
///
/// Accepts an RFC 3339 instant (`2026-11-17T17:00:00+01:00`), which
/// carries its own offset, or a naive `YYYY-MM-DD[THH:MM[:SS]]` value
/// interpreted in `zone`.
///
/// # Errors
///
/// Returns a message when the text matches no accepted form, or when the
/// naive time does not exist in the local zone (a DST gap).
pub fn parse_target(raw: &str, zone: TimeZoneChoice) -> Result<i64, String> {
    let text = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.timestamp_millis());
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            format!("'{text}' is not an RFC 3339 instant or a YYYY-MM-DD[THH:MM[:SS]] date-time")
        })?;

    match zone {
        TimeZoneChoice::Utc => Ok(naive.and_utc().timestamp_millis()),
        TimeZoneChoice::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
            .ok_or_else(|| format!("'{text}' does not exist in the local time zone")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-01-01T00:00:00Z
    const NEW_YEAR_MS: i64 = 1_767_225_600_000;

    fn config(yaml: &str) -> FlipclockConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn rfc3339_target_keeps_offset() {
        assert_eq!(
            parse_target("2026-01-01T01:00:00+01:00", TimeZoneChoice::Local),
            Ok(NEW_YEAR_MS)
        );
        assert_eq!(
            parse_target("2026-01-01T00:00:00Z", TimeZoneChoice::Local),
            Ok(NEW_YEAR_MS)
        );
    }

    #[test]
    fn naive_target_in_utc() {
        for text in [
            "2026-01-01T00:00:00",
            "2026-01-01 00:00:00",
            "2026-01-01T00:00",
            "2026-01-01",
        ] {
            assert_eq!(
                parse_target(text, TimeZoneChoice::Utc),
                Ok(NEW_YEAR_MS),
                "{text}"
            );
        }
    }

    #[test]
    fn naive_target_in_local_zone_parses() {
        assert!(parse_target("2026-11-17T17:00:00", TimeZoneChoice::Local).is_ok());
    }

    #[test]
    fn garbage_target_rejected() {
        let err = parse_target("next tuesday", TimeZoneChoice::Utc).unwrap_err();
        assert!(err.contains("next tuesday"));
    }

    #[test]
    fn defaults_validate() {
        let result = Validator::new().validate(&FlipclockConfig::default(), 0);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
        let settings = result.settings.unwrap();
        assert_eq!(settings.timing, FlipTiming::default());
        assert_eq!(settings.arrival.title, "¡El gran día ha llegado!");
    }

    #[test]
    fn custom_timing_resolves() {
        let result = Validator::new().validate(
            &config(
                "countdown:\n  target: 2026-01-01T00:00:00Z\n  tick: 500ms\n  flip_text_delay: 100ms\n  flip_settle_delay: 200ms\n  reduced_motion: true\n",
            ),
            0,
        );
        let settings = result.settings.unwrap();
        assert_eq!(settings.target_ms, NEW_YEAR_MS);
        assert_eq!(settings.timing.tick_interval, Duration::from_millis(500));
        assert_eq!(settings.timing.text_delay, Duration::from_millis(100));
        assert_eq!(settings.timing.settle_delay, Duration::from_millis(200));
        assert_eq!(settings.timing.motion, Motion::Reduced);
    }

    #[test]
    fn all_errors_collected() {
        let result = Validator::new().validate(
            &config(
                "countdown:\n  target: soon\n  tick: 0s\n  flip_text_delay: 700ms\narrival:\n  title: '  '\n",
            ),
            0,
        );
        assert!(!result.is_valid());
        assert!(result.settings.is_none());
        assert_eq!(
            paths(&result.errors),
            vec![
                "countdown.target",
                "countdown.tick",
                "countdown.flip_text_delay",
                "arrival.title"
            ]
        );
    }

    #[test]
    fn bad_duration_reported() {
        let result = Validator::new().validate(&config("countdown:\n  tick: fast\n"), 0);
        assert_eq!(paths(&result.errors), vec!["countdown.tick"]);
        assert!(result.errors[0].message.contains("fast"));
    }

    #[test]
    fn overlapping_settle_warns() {
        let result = Validator::new().validate(
            &config("countdown:\n  tick: 500ms\n  flip_settle_delay: 600ms\n"),
            0,
        );
        assert!(result.is_valid());
        assert_eq!(paths(&result.warnings), vec!["countdown.flip_settle_delay"]);
        assert!(result.settings.is_some());
    }

    #[test]
    fn past_target_warns() {
        let result = Validator::new().validate(
            &config("countdown:\n  target: 2026-01-01T00:00:00Z\n"),
            NEW_YEAR_MS + 1,
        );
        assert!(result.is_valid());
        assert_eq!(paths(&result.warnings), vec!["countdown.target"]);
    }

    #[test]
    fn target_equal_to_now_still_counts() {
        // Zero remaining renders zeros; arrival needs a negative remainder.
        let result = Validator::new().validate(
            &config("countdown:\n  target: 2026-01-01T00:00:00Z\n"),
            NEW_YEAR_MS,
        );
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn validator_is_reusable() {
        let mut validator = Validator::new();
        let bad = validator.validate(&config("countdown:\n  tick: 0s\n"), 0);
        assert_eq!(bad.errors.len(), 1);
        let good = validator.validate(&FlipclockConfig::default(), 0);
        assert!(good.is_valid());
    }
}
