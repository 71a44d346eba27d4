//! Tokio host for the countdown engine.
//!
//! The engine exposes its next deadline; this driver sleeps until then,
//! polls, and repeats until the engine has nothing left to do or the
//! cancellation token fires.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::countdown::{Clock, CountdownEngine, DisplaySurface, EngineState, EngineStats};

/// How a driven countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The target passed and the arrival message was shown.
    Arrived,
    /// The run was cancelled before arrival.
    Cancelled,
}

/// Summary returned by [`drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Engine counters at the end of the run.
    pub stats: EngineStats,
}

/// A wall-clock reading anchored once and advanced by tokio's monotonic
/// clock.
///
/// Immune to system clock jumps, and follows tokio's paused time in tests.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    base_ms: i64,
    origin: Instant,
}

impl InstantClock {
    /// Anchors `base_ms` (epoch milliseconds) to the current tokio instant.
    #[must_use]
    pub fn anchored(base_ms: i64) -> Self {
        Self {
            base_ms,
            origin: Instant::now(),
        }
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.base_ms.saturating_add(elapsed)
    }
}

/// Starts `engine` and drives it until arrival or cancellation.
///
/// On cancellation the engine is disposed, which drops every pending flip
/// callback before returning.
pub async fn drive<C: Clock, D: DisplaySurface>(
    engine: &mut CountdownEngine<C, D>,
    cancel: CancellationToken,
) -> RunSummary {
    engine.start();

    while let Some(wake) = engine.next_wake() {
        let wait_ms = wake.saturating_sub(engine.clock().now_ms()).max(0);
        let wait = Duration::from_millis(wait_ms.unsigned_abs());

        tokio::select! {
            () = cancel.cancelled() => {
                debug!("countdown cancelled");
                engine.dispose("cancelled");
                break;
            }
            () = tokio::time::sleep(wait) => {
                engine.poll();
            }
        }
    }

    let outcome = match engine.state() {
        EngineState::Arrived => RunOutcome::Arrived,
        EngineState::Pending | EngineState::Counting | EngineState::Disposed => {
            RunOutcome::Cancelled
        }
    };

    RunSummary {
        outcome,
        stats: engine.stats(),
    }
}
