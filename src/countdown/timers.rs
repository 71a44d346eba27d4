//! Virtual timers driven by the engine's clock.
//!
//! [`TickSchedule`] is the repeating tick; [`TimerQueue`] holds the
//! deferred per-unit flip callbacks. Neither sleeps: the host asks for the
//! next deadline, waits however it likes, and then lets the engine fire
//! whatever is due.

use std::collections::BTreeMap;

use super::units::Unit;

/// What a deferred flip callback does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Write the formatted value into the unit's slot.
    ApplyText {
        /// Value to render.
        value: u64,
    },
    /// End the flip effect.
    Settle,
}

/// A callback queued for one display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    /// Unit the callback belongs to.
    pub unit: Unit,
    /// Action to perform.
    pub action: DeferredAction,
}

/// Deferred callbacks ordered by due time, then by insertion.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(i64, u64), Deferred>,
    next_seq: u64,
}

impl TimerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `action` for `unit` at `due_ms`.
    pub fn schedule(&mut self, due_ms: i64, unit: Unit, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.entries.insert((due_ms, seq), Deferred { unit, action });
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_due(&self) -> Option<i64> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Removes and returns the earliest callback if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: i64) -> Option<(i64, Deferred)> {
        let first = self.entries.first_entry()?;
        if first.key().0 > now_ms {
            return None;
        }
        let ((due, _), deferred) = first.remove_entry();
        Some((due, deferred))
    }

    /// Drops every pending callback for `unit`. Returns how many were dropped.
    pub fn cancel_unit(&mut self, unit: Unit) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, d| d.unit != unit);
        before - self.entries.len()
    }

    /// Drops every pending callback. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Number of pending callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fixed-period repeating tick that can be cancelled exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    interval_ms: i64,
    next_due: Option<i64>,
    cancelled: bool,
}

impl TickSchedule {
    /// Creates an unarmed schedule with the given period.
    ///
    /// Periods below one millisecond are clamped to one.
    #[must_use]
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_due: None,
            cancelled: false,
        }
    }

    /// Arms the first repetition one period after `now_ms`.
    ///
    /// No-op when already armed or cancelled.
    pub const fn arm(&mut self, now_ms: i64) {
        if self.cancelled || self.next_due.is_some() {
            return;
        }
        self.next_due = Some(now_ms.saturating_add(self.interval_ms));
    }

    /// Next tick deadline, `None` when unarmed or cancelled.
    #[must_use]
    pub const fn next_due(&self) -> Option<i64> {
        self.next_due
    }

    /// Consumes a due tick and re-arms on the fixed grid.
    ///
    /// Periods that were missed entirely are skipped rather than replayed,
    /// so a late host produces one tick instead of a burst.
    pub const fn consume(&mut self, now_ms: i64) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if due > now_ms {
            return false;
        }
        let missed = (now_ms - due) / self.interval_ms;
        self.next_due = Some(due + (missed + 1) * self.interval_ms);
        true
    }

    /// Cancels the schedule permanently. Returns `false` if already cancelled.
    pub const fn cancel(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        self.next_due = None;
        true
    }
}
