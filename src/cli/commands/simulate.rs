//! Headless countdown on a virtual clock.
//!
//! Jumps the clock from one engine deadline to the next, so simulating an
//! hour takes no longer than simulating a second.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::config::{ConfigLoader, LoaderOptions, parse_target};
use crate::countdown::clock::duration_ms;
use crate::countdown::display::{DisplayOp, RecordedOp};
use crate::countdown::{
    Clock, CountdownEngine, EngineState, EngineStats, ManualClock, MemoryDisplay, SystemClock,
};
use crate::error::{ConfigError, FlipclockError};
use crate::observability::events::timestamp_from_ms;

/// Everything a simulation produced.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    /// Virtual start instant.
    pub start: DateTime<Utc>,
    /// Countdown target.
    pub target: DateTime<Utc>,
    /// Virtual instant the simulation stopped at: the end of the window, or
    /// the last deadline if the engine ran out of work before it.
    pub end: DateTime<Utc>,
    /// Engine state at the end.
    pub state: EngineState,
    /// Engine counters at the end.
    pub stats: EngineStats,
    /// Display operations in the order they were applied.
    pub ops: Vec<RecordedOp>,
}

/// Runs the simulation and prints the report.
///
/// # Errors
///
/// Returns an error if the configuration or `--now` is invalid.
pub fn run(args: &SimulateArgs) -> Result<(), FlipclockError> {
    let report = simulate(args)?;

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Runs the simulation described by `args`.
///
/// # Errors
///
/// Returns an error if the configuration or `--now` is invalid.
pub fn simulate(args: &SimulateArgs) -> Result<SimulationReport, FlipclockError> {
    // The start instant is only known after the target is resolved, so the
    // past-target check is left to the engine's first tick.
    let loader = ConfigLoader::new(LoaderOptions {
        overrides: args.countdown.overrides(),
        strict: false,
        now_ms: i64::MIN,
    });
    let loaded = loader.load(args.countdown.config.as_deref())?;
    for warning in &loaded.warnings {
        tracing::warn!(location = %warning.path, "{}", warning.message);
    }
    let settings = loaded.settings;

    let start_ms = if let Some(now) = &args.now {
        parse_target(now, loaded.config.countdown.timezone).map_err(|message| {
            ConfigError::InvalidValue {
                field: "--now".to_string(),
                value: now.clone(),
                expected: message,
            }
        })?
    } else if let Some(offset) = args.offset {
        settings.target_ms.saturating_sub(duration_ms(offset))
    } else {
        SystemClock.now_ms()
    };
    let end_ms = start_ms.saturating_add(duration_ms(args.duration));

    tracing::info!(
        start = %timestamp_from_ms(start_ms),
        target = %timestamp_from_ms(settings.target_ms),
        "simulating countdown"
    );

    let clock = ManualClock::new(start_ms);
    let display = MemoryDisplay::new().with_clock(clock.clone());
    let mut engine = CountdownEngine::new(settings.target_ms, settings.timing, clock.clone(), display)
        .with_arrival_message(settings.arrival);

    engine.start();
    while let Some(wake) = engine.next_wake() {
        if wake > end_ms {
            break;
        }
        clock.set(wake.max(clock.now_ms()));
        engine.poll();
    }

    let stopped_ms = if engine.next_wake().is_some() {
        end_ms
    } else {
        clock.now_ms()
    };
    let state = engine.state();
    let stats = engine.stats();
    let ops = engine.into_display().ops().to_vec();

    Ok(SimulationReport {
        start: timestamp_from_ms(start_ms),
        target: timestamp_from_ms(settings.target_ms),
        end: timestamp_from_ms(stopped_ms),
        state,
        stats,
        ops,
    })
}

/// Renders a report as one line per display operation.
#[must_use]
pub fn render_human(report: &SimulationReport) -> String {
    let start_ms = report.start.timestamp_millis();
    let mut out = format!(
        "simulating {} -> {} (target {})\n",
        report.start.to_rfc3339_opts(SecondsFormat::Millis, true),
        report.end.to_rfc3339_opts(SecondsFormat::Millis, true),
        report.target.to_rfc3339_opts(SecondsFormat::Millis, true),
    );

    for recorded in &report.ops {
        let offset = recorded.at_ms.unwrap_or(start_ms) - start_ms;
        out.push_str(&format!("+{offset:>7}ms  {}\n", describe(&recorded.op)));
    }

    out.push_str(&format!(
        "state: {:?}, ticks: {}, flips: {}, skipped: {}\n",
        report.state, report.stats.ticks, report.stats.flips, report.stats.skipped
    ));
    out
}

fn describe(op: &DisplayOp) -> String {
    match op {
        DisplayOp::SetText { unit, text } => format!("set_text    {:<8} {text}", unit.name()),
        DisplayOp::FlipStart { unit } => format!("flip_start  {}", unit.name()),
        DisplayOp::FlipEnd { unit } => format!("flip_end    {}", unit.name()),
        DisplayOp::Arrival { title, subtitle } => format!("arrival     {title} | {subtitle}"),
    }
}
