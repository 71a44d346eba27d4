//! Configuration loader.
//!
//! Pipeline:
//! 1. Read the file (or start from defaults when none is given)
//! 2. YAML parsing into [`FlipclockConfig`]
//! 3. Command-line overrides
//! 4. Validation, with warnings promoted to errors in strict mode

use std::path::Path;
use std::time::Duration;

use crate::config::schema::{CountdownSettings, FlipclockConfig, TimeZoneChoice};
use crate::config::validation::Validator;
use crate::countdown::{Clock, SystemClock};
use crate::error::{ConfigError, Severity, ValidationIssue};

/// Source name used when no file is involved.
pub const ARGUMENTS_SOURCE: &str = "<arguments>";

/// Values given on the command line or through the environment.
///
/// Each one replaces the matching file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Target instant text.
    pub target: Option<String>,
    /// Zone for naive targets.
    pub timezone: Option<TimeZoneChoice>,
    /// Tick period.
    pub tick: Option<Duration>,
    /// Delay before the new text is shown.
    pub flip_text_delay: Option<Duration>,
    /// Delay before the flip effect ends.
    pub flip_settle_delay: Option<Duration>,
    /// Forces reduced motion on; `false` leaves the file value alone.
    pub reduced_motion: bool,
}

impl Overrides {
    /// Writes every set override into `config`.
    pub fn apply(&self, config: &mut FlipclockConfig) {
        let section = &mut config.countdown;
        if let Some(target) = &self.target {
            section.target = Some(target.clone());
        }
        if let Some(zone) = self.timezone {
            section.timezone = zone;
        }
        if let Some(tick) = self.tick {
            section.tick = Some(humantime::format_duration(tick).to_string());
        }
        if let Some(delay) = self.flip_text_delay {
            section.flip_text_delay = Some(humantime::format_duration(delay).to_string());
        }
        if let Some(delay) = self.flip_settle_delay {
            section.flip_settle_delay = Some(humantime::format_duration(delay).to_string());
        }
        if self.reduced_motion {
            section.reduced_motion = Some(true);
        }
    }
}

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Command-line overrides.
    pub overrides: Overrides,
    /// Treat warnings as errors.
    pub strict: bool,
    /// Reference instant for the past-target check.
    pub now_ms: i64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            overrides: Overrides::default(),
            strict: false,
            now_ms: SystemClock.now_ms(),
        }
    }
}

/// Result of loading a configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// Merged configuration as written plus overrides.
    pub config: FlipclockConfig,
    /// Resolved settings.
    pub settings: CountdownSettings,
    /// Warnings that did not block loading.
    pub warnings: Vec<ValidationIssue>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads `path`, or defaults plus overrides when `path` is `None`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingFile` if the file cannot be read
    /// - `ConfigError::ParseError` if the YAML is malformed or has unknown keys
    /// - `ConfigError::ValidationError` if validation finds errors (or
    ///   warnings, in strict mode)
    pub fn load(&self, path: Option<&Path>) -> Result<LoadResult, ConfigError> {
        let Some(path) = path else {
            return self.finish(FlipclockConfig::default(), ARGUMENTS_SOURCE);
        };

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let config = parse_document(&raw, path)?;
        self.finish(config, &path.display().to_string())
    }

    /// Loads configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus the missing-file case.
    pub fn load_str(&self, yaml: &str, source_name: &str) -> Result<LoadResult, ConfigError> {
        let config = parse_document(yaml, Path::new(source_name))?;
        self.finish(config, source_name)
    }

    fn finish(
        &self,
        mut config: FlipclockConfig,
        source_name: &str,
    ) -> Result<LoadResult, ConfigError> {
        self.options.overrides.apply(&mut config);

        let mut result = Validator::new().validate(&config, self.options.now_ms);

        if self.options.strict && !result.warnings.is_empty() {
            result.errors.extend(result.warnings.drain(..).map(|w| ValidationIssue {
                severity: Severity::Error,
                ..w
            }));
        }

        match result.settings {
            Some(settings) if result.errors.is_empty() => Ok(LoadResult {
                config,
                settings,
                warnings: result.warnings,
            }),
            _ => Err(ConfigError::ValidationError {
                source_name: source_name.to_string(),
                errors: result.errors,
            }),
        }
    }
}

/// Parses YAML text. A document with no content yields the defaults.
fn parse_document(raw: &str, path: &Path) -> Result<FlipclockConfig, ConfigError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let parse_error = |e: serde_yaml::Error| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    };

    let value: serde_yaml::Value = serde_yaml::from_str(raw).map_err(parse_error)?;
    if value.is_null() {
        return Ok(FlipclockConfig::default());
    }

    serde_yaml::from_str(raw).map_err(parse_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn loader(overrides: Overrides, strict: bool) -> ConfigLoader {
        ConfigLoader::new(LoaderOptions {
            overrides,
            strict,
            now_ms: 0,
        })
    }

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let result = loader(Overrides::default(), false).load(None).unwrap();
        assert_eq!(result.config.countdown.target, None);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_file() {
        let file = write_yaml(
            "countdown:\n  target: 2026-01-01T00:00:00Z\n  tick: 2s\narrival:\n  title: Ya\n",
        );
        let result = loader(Overrides::default(), false)
            .load(Some(file.path()))
            .unwrap();
        assert_eq!(result.settings.target_ms, 1_767_225_600_000);
        assert_eq!(result.settings.timing.tick_interval, Duration::from_secs(2));
        assert_eq!(result.settings.arrival.title, "Ya");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_yaml("# nothing here\n");
        let result = loader(Overrides::default(), false)
            .load(Some(file.path()))
            .unwrap();
        assert_eq!(result.config, FlipclockConfig::default());
    }

    #[test]
    fn missing_file() {
        let err = loader(Overrides::default(), false)
            .load(Some(Path::new("/nonexistent/flipclock.yaml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn malformed_yaml_reports_line() {
        let err = loader(Overrides::default(), false)
            .load_str("countdown:\n  tick: [1s\n", "bad.yaml")
            .unwrap_err();
        match err {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = loader(Overrides::default(), false)
            .load_str("countdown:\n  targte: 2026-01-01\n", "typo.yaml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let overrides = Overrides {
            target: Some("2026-01-01".to_string()),
            timezone: Some(TimeZoneChoice::Utc),
            tick: Some(Duration::from_millis(250)),
            flip_text_delay: Some(Duration::from_millis(50)),
            flip_settle_delay: Some(Duration::from_millis(100)),
            reduced_motion: true,
        };
        let result = loader(overrides, false)
            .load_str(
                "countdown:\n  target: 2030-01-01T00:00:00Z\n  tick: 5s\n",
                "f.yaml",
            )
            .unwrap();
        let settings = result.settings;
        assert_eq!(settings.target_ms, 1_767_225_600_000);
        assert_eq!(settings.timing.tick_interval, Duration::from_millis(250));
        assert_eq!(settings.timing.text_delay, Duration::from_millis(50));
        assert_eq!(settings.timing.settle_delay, Duration::from_millis(100));
        assert_eq!(settings.timing.motion, crate::countdown::Motion::Reduced);
    }

    #[test]
    fn validation_errors_name_source() {
        let err = loader(Overrides::default(), false)
            .load_str("countdown:\n  tick: 0s\n", "zero.yaml")
            .unwrap_err();
        match err {
            ConfigError::ValidationError {
                source_name,
                errors,
            } => {
                assert_eq!(source_name, "zero.yaml");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "countdown.tick");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn strict_promotes_warnings() {
        let yaml = "countdown:\n  tick: 500ms\n";
        let lenient = loader(Overrides::default(), false)
            .load_str(yaml, "w.yaml")
            .unwrap();
        assert_eq!(lenient.warnings.len(), 1);

        let err = loader(Overrides::default(), true)
            .load_str(yaml, "w.yaml")
            .unwrap_err();
        match err {
            ConfigError::ValidationError { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].severity, Severity::Error);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
