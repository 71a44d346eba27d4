//! Countdown engine orchestration.
//!
//! The `CountdownEngine` owns the target instant, the per-unit render
//! bookkeeping, the repeating tick and the deferred flip callbacks. It is
//! entirely clock-driven: nothing here sleeps. A host (see
//! [`crate::runtime`]) waits until [`CountdownEngine::next_wake`] and then
//! calls [`CountdownEngine::poll`]; tests do the same with a
//! [`ManualClock`](super::ManualClock).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::observability::events::{Event, EventEmitter, timestamp_from_ms};
use crate::observability::metrics;

use super::clock::{Clock, duration_ms};
use super::display::{ArrivalMessage, DisplaySurface};
use super::flip::{FlipState, UnitTrack};
use super::timers::{Deferred, DeferredAction, TickSchedule, TimerQueue};
use super::units::{DisplayUnits, Unit, decompose, format_value};

// ============================================================================
// Configuration types
// ============================================================================

/// Whether value changes are animated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    /// Flip effect with deferred text update.
    #[default]
    Full,
    /// No flip effect; text is written as soon as the value changes.
    Reduced,
}

/// Tick period and flip delays.
///
/// `text_delay` and `settle_delay` are both measured from the moment a
/// value change is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipTiming {
    /// Period of the repeating tick.
    pub tick_interval: Duration,
    /// Delay before the new text is written.
    pub text_delay: Duration,
    /// Delay before the flip effect ends.
    pub settle_delay: Duration,
    /// Animated or reduced motion.
    pub motion: Motion,
}

impl Default for FlipTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            text_delay: Duration::from_millis(300),
            settle_delay: Duration::from_millis(600),
            motion: Motion::Full,
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Lifecycle of an engine. `Arrived` and `Disposed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Constructed, not ticked yet.
    Pending,
    /// Counting down.
    Counting,
    /// Target passed; arrival message shown.
    Arrived,
    /// Torn down before arrival (or after it).
    Disposed,
}

impl EngineState {
    /// Returns `true` for states no tick can leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Arrived | Self::Disposed)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Remaining time decomposed and pushed to the units.
    Counted(DisplayUnits),
    /// This tick observed the target passing.
    Arrived,
    /// The engine was already terminal; nothing happened.
    Idle,
}

/// What a single unit update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitUpdate {
    /// Value equals the last rendered one.
    Unchanged,
    /// The display has no slot for this unit.
    Skipped,
    /// Flip started; text follows after the text delay.
    Flipping,
    /// Text written immediately (reduced motion).
    Rendered,
    /// The engine is terminal.
    Inactive,
}

/// Result of a [`CountdownEngine::poll`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Deferred callbacks that fired.
    pub callbacks_fired: usize,
    /// The tick that ran, if one was due.
    pub tick: Option<TickOutcome>,
}

/// Running counters for an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Ticks evaluated (including the arrival tick).
    pub ticks: u64,
    /// Unit value changes rendered.
    pub flips: u64,
    /// Unit renders skipped for a missing slot.
    pub skipped: u64,
}

// ============================================================================
// Engine
// ============================================================================

/// Flip-style countdown to a fixed instant.
///
/// Coordinates:
/// - the repeating tick and its one-way cancellation on arrival
/// - remaining-time decomposition into display units
/// - per-unit change detection against the last rendered value
/// - deferred text/settle callbacks for the flip effect
/// - teardown that drops every outstanding callback
pub struct CountdownEngine<C, D> {
    target_ms: i64,
    timing: FlipTiming,
    clock: C,
    display: D,
    message: ArrivalMessage,
    tracks: [UnitTrack; 4],
    timers: TimerQueue,
    schedule: TickSchedule,
    state: EngineState,
    stats: EngineStats,
    events: Option<Arc<EventEmitter>>,
}

impl<C: Clock, D: DisplaySurface> CountdownEngine<C, D> {
    /// Creates an engine counting down to `target_ms` (epoch milliseconds).
    #[must_use]
    pub fn new(target_ms: i64, timing: FlipTiming, clock: C, display: D) -> Self {
        Self {
            target_ms,
            timing,
            clock,
            display,
            message: ArrivalMessage::default(),
            tracks: [UnitTrack::default(); 4],
            timers: TimerQueue::new(),
            schedule: TickSchedule::new(duration_ms(timing.tick_interval)),
            state: EngineState::Pending,
            stats: EngineStats::default(),
            events: None,
        }
    }

    /// Replaces the message shown on arrival.
    #[must_use]
    pub fn with_arrival_message(mut self, message: ArrivalMessage) -> Self {
        self.message = message;
        self
    }

    /// Attaches a structured event stream.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = Some(events);
        self
    }

    // ---- Accessors ----

    /// Target instant in epoch milliseconds.
    #[must_use]
    pub const fn target_ms(&self) -> i64 {
        self.target_ms
    }

    /// Tick period and flip delays.
    #[must_use]
    pub const fn timing(&self) -> &FlipTiming {
        &self.timing
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Running counters.
    #[must_use]
    pub const fn stats(&self) -> EngineStats {
        self.stats
    }

    /// The clock driving this engine.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The presentation surface.
    #[must_use]
    pub const fn display(&self) -> &D {
        &self.display
    }

    /// Mutable access to the presentation surface.
    pub const fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Consumes the engine and returns the surface.
    pub fn into_display(self) -> D {
        self.display
    }

    /// Last value accepted for `unit`, `None` before its first render.
    #[must_use]
    pub const fn previous(&self, unit: Unit) -> Option<u64> {
        self.tracks[unit.index()].previous()
    }

    /// Flip state of `unit`.
    #[must_use]
    pub const fn flip_state(&self, unit: Unit) -> FlipState {
        self.tracks[unit.index()].state()
    }

    /// Deferred callbacks still waiting to fire.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` while the repeating tick is armed.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.schedule.next_due().is_some()
    }

    /// Milliseconds until the target at the current clock reading.
    #[must_use]
    pub fn remaining_ms(&self) -> i64 {
        self.target_ms.saturating_sub(self.clock.now_ms())
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    ///
    /// `None` once the tick is cancelled and no callbacks remain.
    #[must_use]
    pub fn next_wake(&self) -> Option<i64> {
        match (self.schedule.next_due(), self.timers.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ---- Lifecycle ----

    /// Runs the first tick immediately and arms the repeating schedule.
    ///
    /// Calling `start` again, or after the engine went terminal, does
    /// nothing and returns [`TickOutcome::Idle`].
    pub fn start(&mut self) -> TickOutcome {
        if self.state.is_terminal() || self.schedule.next_due().is_some() {
            return TickOutcome::Idle;
        }

        let now = self.clock.now_ms();
        let remaining_ms = self.remaining_ms();
        info!(
            target_at = %timestamp_from_ms(self.target_ms),
            remaining_ms,
            "countdown started"
        );
        self.emit(Event::CountdownStarted {
            timestamp: timestamp_from_ms(now),
            target: timestamp_from_ms(self.target_ms),
            remaining_ms,
        });

        let outcome = self.tick();
        self.schedule.arm(now);
        outcome
    }

    /// Recomputes the remaining time and pushes it to every unit.
    ///
    /// Once the target has passed this shows the arrival message, cancels
    /// the tick and all pending flip callbacks, and goes terminal. Later
    /// calls are no-ops.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.is_terminal() {
            trace!(state = ?self.state, "tick ignored");
            return TickOutcome::Idle;
        }

        let now = self.clock.now_ms();
        let remaining = self.target_ms.saturating_sub(now);
        self.stats.ticks += 1;
        metrics::record_tick(remaining);

        if remaining < 0 {
            self.arrive(now);
            return TickOutcome::Arrived;
        }

        self.state = EngineState::Counting;
        let units = decompose(remaining.unsigned_abs());
        trace!(remaining_ms = remaining, ?units, "tick");
        for (unit, value) in units.iter() {
            self.update_unit_at(unit, value, now);
        }
        TickOutcome::Counted(units)
    }

    /// Pushes a new value to one unit.
    ///
    /// Unchanged values are ignored. A change records the value at once and
    /// either starts a flip (text written after the text delay, effect ended
    /// after the settle delay) or, with reduced motion, writes the text now.
    pub fn update_unit(&mut self, unit: Unit, value: u64) -> UnitUpdate {
        let now = self.clock.now_ms();
        self.update_unit_at(unit, value, now)
    }

    /// Fires every callback due by now, then the tick if it is due.
    pub fn poll(&mut self) -> PollOutcome {
        let now = self.clock.now_ms();
        let mut outcome = PollOutcome::default();

        while let Some((due, deferred)) = self.timers.pop_due(now) {
            self.apply_deferred(deferred, due);
            outcome.callbacks_fired += 1;
        }

        if self.schedule.consume(now) {
            outcome.tick = Some(self.tick());
        }

        outcome
    }

    /// Tears the engine down.
    ///
    /// Cancels the tick, drops every pending callback and clears any flip
    /// still shown. Returns `false` if the engine was already disposed.
    pub fn dispose(&mut self, reason: &str) -> bool {
        if self.state == EngineState::Disposed {
            return false;
        }

        self.schedule.cancel();
        let dropped = self.timers.cancel_all();
        for unit in Unit::ALL {
            if self.tracks[unit.index()].settle() && self.display.has_target(unit) {
                self.display.set_flipping(unit, false);
            }
        }

        self.state = EngineState::Disposed;
        info!(reason, dropped_callbacks = dropped, "countdown disposed");
        self.emit(Event::Disposed {
            timestamp: timestamp_from_ms(self.clock.now_ms()),
            reason: reason.to_string(),
        });
        true
    }

    // ---- Internals ----

    fn update_unit_at(&mut self, unit: Unit, value: u64, now: i64) -> UnitUpdate {
        if self.state.is_terminal() {
            return UnitUpdate::Inactive;
        }

        let track = &mut self.tracks[unit.index()];
        if track.is_unchanged(value) {
            return UnitUpdate::Unchanged;
        }

        if !self.display.has_target(unit) {
            trace!(%unit, value, "no display slot, skipping");
            self.stats.skipped += 1;
            metrics::record_unit_skipped(unit);
            return UnitUpdate::Skipped;
        }

        track.record(value);
        self.stats.flips += 1;
        metrics::record_flip(unit);
        self.emit(Event::UnitFlipped {
            timestamp: timestamp_from_ms(now),
            unit,
            value,
        });

        match self.timing.motion {
            Motion::Reduced => {
                debug!(%unit, value, "render");
                self.display.set_text(unit, &format_value(value));
                UnitUpdate::Rendered
            }
            Motion::Full => {
                let restarted = self.tracks[unit.index()].begin_flip(now);
                if restarted {
                    let dropped = self.timers.cancel_unit(unit);
                    debug!(%unit, value, dropped, "flip restarted");
                } else {
                    debug!(%unit, value, "flip");
                    self.display.set_flipping(unit, true);
                }

                let text_at = now.saturating_add(duration_ms(self.timing.text_delay));
                let settle_at = now.saturating_add(duration_ms(self.timing.settle_delay));
                self.timers
                    .schedule(text_at, unit, DeferredAction::ApplyText { value });
                self.timers.schedule(settle_at, unit, DeferredAction::Settle);
                UnitUpdate::Flipping
            }
        }
    }

    fn apply_deferred(&mut self, deferred: Deferred, due: i64) {
        let Deferred { unit, action } = deferred;
        if !self.display.has_target(unit) {
            trace!(%unit, due, "slot gone before callback");
            self.tracks[unit.index()].settle();
            return;
        }

        match action {
            DeferredAction::ApplyText { value } => {
                self.display.set_text(unit, &format_value(value));
            }
            DeferredAction::Settle => {
                if self.tracks[unit.index()].settle() {
                    self.display.set_flipping(unit, false);
                }
            }
        }
    }

    fn arrive(&mut self, now: i64) {
        self.display.show_arrival(&self.message);
        self.schedule.cancel();
        let dropped = self.timers.cancel_all();
        for track in &mut self.tracks {
            track.settle();
        }
        self.state = EngineState::Arrived;

        metrics::record_arrival();
        info!(
            target_at = %timestamp_from_ms(self.target_ms),
            dropped_callbacks = dropped,
            "countdown arrived"
        );
        self.emit(Event::Arrived {
            timestamp: timestamp_from_ms(now),
            target: timestamp_from_ms(self.target_ms),
            cancelled_callbacks: dropped,
        });
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

impl<C, D> std::fmt::Debug for CountdownEngine<C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("target_ms", &self.target_ms)
            .field("state", &self.state)
            .field("pending_callbacks", &self.timers.len())
            .field("next_tick", &self.schedule.next_due())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::clock::ManualClock;
    use crate::countdown::display::MemoryDisplay;

    const T0: i64 = 1_800_000_000_000;

    fn engine_at(
        target_offset_ms: i64,
        timing: FlipTiming,
    ) -> (ManualClock, CountdownEngine<ManualClock, MemoryDisplay>) {
        let clock = ManualClock::new(T0);
        let engine = CountdownEngine::new(
            T0 + target_offset_ms,
            timing,
            clock.clone(),
            MemoryDisplay::new(),
        );
        (clock, engine)
    }

    /// Advances the clock in `step` increments, polling after each one.
    fn run_for(
        clock: &ManualClock,
        engine: &mut CountdownEngine<ManualClock, MemoryDisplay>,
        total: Duration,
        step: Duration,
    ) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            clock.advance(step);
            elapsed += step;
            engine.poll();
        }
    }

    // ---- Unit updates ----

    #[test]
    fn first_update_renders_even_zero() {
        let (_, mut engine) = engine_at(10_000, FlipTiming::default());
        assert_eq!(engine.previous(Unit::Days), None);
        assert_eq!(engine.update_unit(Unit::Days, 0), UnitUpdate::Flipping);
        assert_eq!(engine.previous(Unit::Days), Some(0));
        assert!(engine.display().is_flipping(Unit::Days));
    }

    #[test]
    fn unchanged_value_is_noop() {
        let (_, mut engine) = engine_at(10_000, FlipTiming::default());
        assert_eq!(engine.update_unit(Unit::Hours, 5), UnitUpdate::Flipping);
        let ops_before = engine.display().ops().len();
        assert_eq!(engine.update_unit(Unit::Hours, 5), UnitUpdate::Unchanged);
        assert_eq!(engine.display().ops().len(), ops_before);
        assert_eq!(engine.pending_callbacks(), 2);
        assert_eq!(engine.display().flip_count(Unit::Hours), 1);
    }

    #[test]
    fn flip_writes_text_at_midpoint_and_settles() {
        let (clock, mut engine) = engine_at(10_000, FlipTiming::default());
        engine.update_unit(Unit::Seconds, 5);

        assert_eq!(engine.display().text(Unit::Seconds), None);
        assert_eq!(
            engine.flip_state(Unit::Seconds),
            FlipState::Animating { since_ms: T0 }
        );

        clock.advance(Duration::from_millis(299));
        assert_eq!(engine.poll().callbacks_fired, 0);
        assert_eq!(engine.display().text(Unit::Seconds), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(engine.poll().callbacks_fired, 1);
        assert_eq!(engine.display().text(Unit::Seconds), Some("05"));
        assert!(engine.display().is_flipping(Unit::Seconds));

        clock.advance(Duration::from_millis(300));
        assert_eq!(engine.poll().callbacks_fired, 1);
        assert!(!engine.display().is_flipping(Unit::Seconds));
        assert_eq!(engine.flip_state(Unit::Seconds), FlipState::Idle);
        assert_eq!(engine.pending_callbacks(), 0);
    }

    #[test]
    fn missing_target_skips_only_that_unit() {
        let clock = ManualClock::new(T0);
        let display = MemoryDisplay::new().without_target(Unit::Hours);
        let mut engine =
            CountdownEngine::new(T0 + 3_661_000, FlipTiming::default(), clock, display);

        engine.start();
        assert_eq!(engine.stats().skipped, 1);
        assert_eq!(engine.previous(Unit::Hours), None);
        assert_eq!(engine.previous(Unit::Minutes), Some(1));
        assert_eq!(engine.display().flip_count(Unit::Hours), 0);
        assert_eq!(engine.display().flip_count(Unit::Seconds), 1);
    }

    #[test]
    fn slot_appearing_later_gets_rendered() {
        let clock = ManualClock::new(T0);
        let display = MemoryDisplay::new().without_target(Unit::Days);
        let mut engine =
            CountdownEngine::new(T0 + 3_661_000, FlipTiming::default(), clock, display);
        assert_eq!(engine.update_unit(Unit::Days, 0), UnitUpdate::Skipped);
        engine.display_mut().restore_target(Unit::Days);
        assert_eq!(engine.update_unit(Unit::Days, 0), UnitUpdate::Flipping);
    }

    #[test]
    fn reduced_motion_writes_immediately() {
        let timing = FlipTiming {
            motion: Motion::Reduced,
            ..FlipTiming::default()
        };
        let (_, mut engine) = engine_at(10_000, timing);
        assert_eq!(engine.update_unit(Unit::Minutes, 7), UnitUpdate::Rendered);
        assert_eq!(engine.display().text(Unit::Minutes), Some("07"));
        assert!(!engine.display().is_flipping(Unit::Minutes));
        assert_eq!(engine.pending_callbacks(), 0);
    }

    #[test]
    fn rapid_change_supersedes_pending_flip() {
        let (clock, mut engine) = engine_at(10_000, FlipTiming::default());
        engine.update_unit(Unit::Seconds, 9);
        clock.advance(Duration::from_millis(100));
        assert_eq!(engine.update_unit(Unit::Seconds, 8), UnitUpdate::Flipping);
        assert_eq!(engine.previous(Unit::Seconds), Some(8));
        assert_eq!(engine.pending_callbacks(), 2);

        run_for(
            &clock,
            &mut engine,
            Duration::from_millis(700),
            Duration::from_millis(50),
        );
        assert_eq!(engine.display().texts_written(Unit::Seconds), vec!["08"]);
        assert_eq!(engine.display().flip_count(Unit::Seconds), 1);
        assert!(!engine.display().is_flipping(Unit::Seconds));
    }

    // ---- Ticks ----

    #[test]
    fn remaining_follows_clock() {
        let (clock, mut engine) = engine_at(10_000, FlipTiming::default());
        engine.start();
        assert_eq!(engine.remaining_ms(), 10_000);
        clock.advance(Duration::from_millis(2_500));
        assert_eq!(engine.remaining_ms(), 7_500);
        clock.advance(Duration::from_secs(8));
        assert_eq!(engine.remaining_ms(), -500);
    }

    #[test]
    fn start_renders_all_units_and_arms_tick() {
        let (clock, mut engine) = engine_at(3_661_000, FlipTiming::default());
        let outcome = engine.start();
        assert_eq!(
            outcome,
            TickOutcome::Counted(DisplayUnits {
                days: 0,
                hours: 1,
                minutes: 1,
                seconds: 1,
            })
        );
        assert_eq!(engine.state(), EngineState::Counting);
        assert_eq!(engine.next_wake(), Some(T0 + 300));
        assert!(engine.is_scheduled());

        clock.advance(Duration::from_millis(600));
        engine.poll();
        for unit in Unit::ALL {
            assert!(!engine.display().is_flipping(unit));
        }
        assert_eq!(engine.display().text(Unit::Days), Some("00"));
        assert_eq!(engine.display().text(Unit::Hours), Some("01"));
        assert_eq!(engine.next_wake(), Some(T0 + 1_000));
    }

    #[test]
    fn start_twice_does_not_double_tick() {
        let (_, mut engine) = engine_at(3_661_000, FlipTiming::default());
        engine.start();
        assert_eq!(engine.start(), TickOutcome::Idle);
        assert_eq!(engine.stats().ticks, 1);
    }

    #[test]
    fn second_tick_flips_seconds_only() {
        let (clock, mut engine) = engine_at(3_661_000, FlipTiming::default());
        engine.start();
        clock.advance(Duration::from_millis(1_000));
        let outcome = engine.poll();
        assert!(matches!(outcome.tick, Some(TickOutcome::Counted(_))));

        assert_eq!(engine.display().flip_count(Unit::Seconds), 2);
        assert_eq!(engine.display().flip_count(Unit::Minutes), 1);
        assert_eq!(engine.display().flip_count(Unit::Hours), 1);
        assert_eq!(engine.display().flip_count(Unit::Days), 1);
        assert_eq!(engine.previous(Unit::Seconds), Some(0));
    }

    #[test]
    fn exact_zero_remaining_renders_zeros() {
        let timing = FlipTiming {
            motion: Motion::Reduced,
            ..FlipTiming::default()
        };
        let (_, mut engine) = engine_at(0, timing);
        assert_eq!(
            engine.tick(),
            TickOutcome::Counted(DisplayUnits::default())
        );
        for unit in Unit::ALL {
            assert_eq!(engine.display().text(unit), Some("00"));
        }
    }

    // ---- Arrival ----

    #[test]
    fn arrival_is_terminal() {
        let (_, mut engine) = engine_at(-1, FlipTiming::default());
        assert_eq!(engine.start(), TickOutcome::Arrived);
        assert_eq!(engine.state(), EngineState::Arrived);
        assert!(!engine.is_scheduled());
        assert_eq!(engine.next_wake(), None);

        let ops = engine.display().ops().len();
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.display().ops().len(), ops);
        assert_eq!(engine.update_unit(Unit::Seconds, 3), UnitUpdate::Inactive);
        assert_eq!(engine.stats().ticks, 1);
    }

    #[test]
    fn arrival_cancels_pending_flips() {
        let (clock, mut engine) = engine_at(500, FlipTiming::default());
        engine.start();
        assert_eq!(engine.pending_callbacks(), 8);

        // Tick past the target before any flip callback ran.
        clock.advance(Duration::from_millis(501));
        assert_eq!(engine.tick(), TickOutcome::Arrived);
        assert_eq!(engine.pending_callbacks(), 0);
        assert!(engine.display().texts_written(Unit::Seconds).is_empty());

        let arrived_at = engine.display().ops().len();
        clock.advance(Duration::from_secs(5));
        engine.poll();
        assert_eq!(engine.display().ops().len(), arrived_at);
        assert!(engine.display().arrival().is_some());
    }

    #[test]
    fn custom_arrival_message() {
        let (_, engine) = engine_at(-10, FlipTiming::default());
        let mut engine = engine.with_arrival_message(ArrivalMessage {
            title: "We're married".to_string(),
            subtitle: String::new(),
        });
        engine.tick();
        assert_eq!(
            engine.display().arrival().map(|m| m.title.as_str()),
            Some("We're married")
        );
    }

    // ---- Teardown ----

    #[test]
    fn dispose_drops_callbacks_and_clears_flips() {
        let (clock, mut engine) = engine_at(3_661_000, FlipTiming::default());
        engine.start();
        assert!(engine.display().is_flipping(Unit::Seconds));

        assert!(engine.dispose("test"));
        assert!(!engine.dispose("test"));
        assert_eq!(engine.state(), EngineState::Disposed);
        assert_eq!(engine.pending_callbacks(), 0);
        assert_eq!(engine.next_wake(), None);
        for unit in Unit::ALL {
            assert!(!engine.display().is_flipping(unit));
        }

        let ops = engine.display().ops().len();
        clock.advance(Duration::from_secs(2));
        engine.poll();
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.display().ops().len(), ops);
    }

    #[test]
    fn events_are_emitted() {
        let events = Arc::new(EventEmitter::noop());
        let (clock, engine) = engine_at(1_500, FlipTiming::default());
        let mut engine = engine.with_events(Arc::clone(&events));
        engine.start();
        // started + 4 flips
        assert_eq!(events.event_count(), 5);

        clock.advance(Duration::from_secs(2));
        engine.poll();
        engine.dispose("done");
        // + arrived + disposed
        assert_eq!(events.event_count(), 7);
    }

    #[test]
    fn late_poll_runs_single_tick() {
        let (clock, mut engine) = engine_at(100_000, FlipTiming::default());
        engine.start();
        clock.advance(Duration::from_millis(5_200));
        let outcome = engine.poll();
        assert!(outcome.tick.is_some());
        assert_eq!(engine.stats().ticks, 2);
        assert_eq!(engine.next_wake(), Some(T0 + 5_500));
    }
}
