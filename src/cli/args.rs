//! CLI argument definitions.
//!
//! All Clap derive structs for `flipclock` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{Overrides, TimeZoneChoice};
use crate::error::ExitCode;

// ============================================================================
// Root CLI
// ============================================================================

/// Flip-style countdown to a fixed date and time.
#[derive(Parser, Debug)]
#[command(name = "flipclock", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "FLIPCLOCK_COLOR")]
    pub color: ColorChoice,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a live countdown in the terminal.
    Run(RunArgs),

    /// Run the countdown on a virtual clock and print what it displays.
    Simulate(SimulateArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Shared countdown options
// ============================================================================

/// Options that describe the countdown itself.
#[derive(Args, Debug, Clone, Default)]
pub struct CountdownArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "FLIPCLOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Target date-time (RFC 3339, or naive local time).
    #[arg(short, long, env = "FLIPCLOCK_TARGET")]
    pub target: Option<String>,

    /// Interpret a naive target as UTC instead of local time.
    #[arg(long)]
    pub utc: bool,

    /// Tick period (e.g. `1s`, `500ms`).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub tick: Option<Duration>,

    /// Delay before a flipped unit shows its new value.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub flip_text_delay: Option<Duration>,

    /// Delay before the flip effect ends.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub flip_settle_delay: Option<Duration>,

    /// Write changed values immediately, without the flip effect.
    #[arg(long, env = "FLIPCLOCK_REDUCED_MOTION")]
    pub reduced_motion: bool,
}

impl CountdownArgs {
    /// Collects the values that override the configuration file.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            target: self.target.clone(),
            timezone: self.utc.then_some(TimeZoneChoice::Utc),
            tick: self.tick,
            flip_text_delay: self.flip_text_delay,
            flip_settle_delay: self.flip_settle_delay,
            reduced_motion: self.reduced_motion,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Countdown options.
    #[command(flatten)]
    pub countdown: CountdownArgs,

    /// Print one line per change instead of redrawing in place.
    #[arg(long)]
    pub plain: bool,

    /// Append JSONL countdown events to this file.
    #[arg(long, env = "FLIPCLOCK_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, env = "FLIPCLOCK_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("start").multiple(false))]
pub struct SimulateArgs {
    /// Countdown options.
    #[command(flatten)]
    pub countdown: CountdownArgs,

    /// Virtual start instant (same forms as `--target`).
    #[arg(long, group = "start")]
    pub now: Option<String>,

    /// Start this long before the target.
    #[arg(long, group = "start", value_parser = humantime::parse_duration)]
    pub offset: Option<Duration>,

    /// Virtual time to simulate.
    #[arg(long, default_value = "3s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

/// Exit code for a failed [`Cli::try_parse`]: `--help` and `--version`
/// succeed, anything else is a usage error.
#[must_use]
pub fn parse_exit_code(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::USAGE_ERROR,
    }
}
