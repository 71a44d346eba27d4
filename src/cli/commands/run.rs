//! Live terminal countdown.

use std::io::IsTerminal;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{ColorChoice, RunArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::countdown::{CountdownEngine, SystemClock, TerminalDisplay};
use crate::error::FlipclockError;
use crate::observability::{EventEmitter, init_metrics};
use crate::runtime::{self, RunOutcome};

/// Runs the countdown on stdout until arrival or cancellation.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the events file
/// cannot be opened, or the metrics listener cannot bind.
pub async fn run(
    args: &RunArgs,
    color: ColorChoice,
    cancel: CancellationToken,
) -> Result<(), FlipclockError> {
    let loader = ConfigLoader::new(LoaderOptions {
        overrides: args.countdown.overrides(),
        ..LoaderOptions::default()
    });
    let loaded = loader.load(args.countdown.config.as_deref())?;

    for warning in &loaded.warnings {
        tracing::warn!(location = %warning.path, "{}", warning.message);
    }

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
        tracing::info!(port, "metrics endpoint listening");
    }

    let events = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let settings = loaded.settings;
    let ansi = !args.plain && stdout_ansi(color);
    let display = TerminalDisplay::new(std::io::stdout(), settings.labels, ansi);

    let mut engine = CountdownEngine::new(settings.target_ms, settings.timing, SystemClock, display)
        .with_arrival_message(settings.arrival)
        .with_events(Arc::new(events));

    let summary = runtime::drive(&mut engine, cancel).await;

    if ansi && summary.outcome == RunOutcome::Cancelled {
        // leave the redrawn line intact
        println!();
    }

    tracing::info!(
        outcome = ?summary.outcome,
        ticks = summary.stats.ticks,
        flips = summary.stats.flips,
        "countdown finished"
    );
    Ok(())
}

fn stdout_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => {
            std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}
