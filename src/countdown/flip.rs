//! Per-unit flip tracking.
//!
//! Each display unit remembers the last value it rendered and whether its
//! flip effect is currently running. The effect itself is a two-state
//! machine: `Idle -> Animating -> Idle`.

use serde::Serialize;

/// Flip effect state for one display unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlipState {
    /// No effect running.
    #[default]
    Idle,
    /// Effect started at `since_ms` and has not settled yet.
    Animating {
        /// Epoch milliseconds when the flip began.
        since_ms: i64,
    },
}

impl FlipState {
    /// Returns `true` while the effect is running.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        matches!(self, Self::Animating { .. })
    }
}

/// Render bookkeeping for a single display unit.
///
/// `previous` starts unset, which never equals a real value, so the first
/// tick always renders even when the computed value is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitTrack {
    previous: Option<u64>,
    state: FlipState,
}

impl UnitTrack {
    /// Last value accepted for rendering, or `None` before the first one.
    #[must_use]
    pub const fn previous(&self) -> Option<u64> {
        self.previous
    }

    /// Current flip state.
    #[must_use]
    pub const fn state(&self) -> FlipState {
        self.state
    }

    /// Returns `true` when `value` is what this unit already shows.
    #[must_use]
    pub fn is_unchanged(&self, value: u64) -> bool {
        self.previous == Some(value)
    }

    /// Records `value` as rendered.
    pub const fn record(&mut self, value: u64) {
        self.previous = Some(value);
    }

    /// Enters `Animating`. Returns `true` if a previous flip was still running.
    pub const fn begin_flip(&mut self, now_ms: i64) -> bool {
        let restarted = self.state.is_animating();
        self.state = FlipState::Animating { since_ms: now_ms };
        restarted
    }

    /// Returns to `Idle`. Returns `true` if a flip was actually running.
    pub const fn settle(&mut self) -> bool {
        let was_animating = self.state.is_animating();
        self.state = FlipState::Idle;
        was_animating
    }
}
