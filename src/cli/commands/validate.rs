//! Configuration validation command.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{ConfigError, FlipclockError, ValidationIssue};

/// Validation outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// File as given on the command line.
    pub file: String,
    /// Whether the file can be used.
    pub valid: bool,
    /// Blocking problems.
    pub errors: Vec<String>,
    /// Non-blocking problems.
    pub warnings: Vec<String>,
}

impl FileReport {
    fn valid(path: &Path, warnings: &[ValidationIssue]) -> Self {
        Self {
            file: path.display().to_string(),
            valid: true,
            errors: Vec::new(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }

    fn invalid(path: &Path, error: &ConfigError) -> Self {
        let errors = match error {
            ConfigError::ValidationError { errors, .. } => {
                errors.iter().map(ToString::to_string).collect()
            }
            other => vec![other.to_string()],
        };
        Self {
            file: path.display().to_string(),
            valid: false,
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Validates every file, prints a report, and fails if any file is
/// invalid.
///
/// # Errors
///
/// Returns the first file's error after all files have been reported.
pub fn run(args: &ValidateArgs) -> Result<(), FlipclockError> {
    let (reports, first_failure) = check_files(&args.files, args.strict);

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                print!("{}", render_human(report));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_failure.map_or(Ok(()), |e| Err(e.into()))
}

/// Validates `files`, returning one report each plus the first failure.
pub fn check_files<P: AsRef<Path>>(
    files: &[P],
    strict: bool,
) -> (Vec<FileReport>, Option<ConfigError>) {
    let loader = ConfigLoader::new(LoaderOptions {
        strict,
        ..LoaderOptions::default()
    });

    let mut reports = Vec::with_capacity(files.len());
    let mut first_failure = None;

    for path in files {
        let path = path.as_ref();
        tracing::info!(file = %path.display(), "validating configuration");
        match loader.load(Some(path)) {
            Ok(result) => reports.push(FileReport::valid(path, &result.warnings)),
            Err(e) => {
                reports.push(FileReport::invalid(path, &e));
                first_failure.get_or_insert(e);
            }
        }
    }

    (reports, first_failure)
}

fn render_human(report: &FileReport) -> String {
    let verdict = if report.valid { "ok" } else { "invalid" };
    let mut out = format!("{}: {verdict}\n", report.file);
    for line in report.errors.iter().chain(&report.warnings) {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
