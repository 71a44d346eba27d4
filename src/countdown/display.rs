//! Presentation surfaces the countdown writes into.
//!
//! The engine owns none of these; it only pushes text, flip flags and the
//! final arrival message through [`DisplaySurface`]. A surface may lack a
//! slot for some unit, in which case the engine simply skips that unit.

use std::collections::BTreeSet;
use std::io::Write;

use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::units::Unit;

// ============================================================================
// Surface trait
// ============================================================================

/// A place the countdown renders to.
pub trait DisplaySurface {
    /// Returns `true` if the surface has a slot for `unit`.
    fn has_target(&self, unit: Unit) -> bool;

    /// Replaces the text shown in the slot for `unit`.
    fn set_text(&mut self, unit: Unit, text: &str);

    /// Turns the flip effect for `unit` on or off.
    fn set_flipping(&mut self, unit: Unit, flipping: bool);

    /// Replaces the whole countdown region with the arrival message.
    fn show_arrival(&mut self, message: &ArrivalMessage);
}

impl<S: DisplaySurface + ?Sized> DisplaySurface for Box<S> {
    fn has_target(&self, unit: Unit) -> bool {
        (**self).has_target(unit)
    }

    fn set_text(&mut self, unit: Unit, text: &str) {
        (**self).set_text(unit, text);
    }

    fn set_flipping(&mut self, unit: Unit, flipping: bool) {
        (**self).set_flipping(unit, flipping);
    }

    fn show_arrival(&mut self, message: &ArrivalMessage) {
        (**self).show_arrival(message);
    }
}

// ============================================================================
// Static content
// ============================================================================

/// Text shown once the target instant has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrivalMessage {
    /// Headline.
    pub title: String,
    /// Secondary line, omitted when empty.
    pub subtitle: String,
}

impl Default for ArrivalMessage {
    fn default() -> Self {
        Self {
            title: "¡El gran día ha llegado!".to_string(),
            subtitle: "Gracias por acompañarnos en este momento especial".to_string(),
        }
    }
}

/// Captions printed next to each unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitLabels {
    /// Caption for days.
    pub days: String,
    /// Caption for hours.
    pub hours: String,
    /// Caption for minutes.
    pub minutes: String,
    /// Caption for seconds.
    pub seconds: String,
}

impl UnitLabels {
    /// Caption for `unit`.
    #[must_use]
    pub fn get(&self, unit: Unit) -> &str {
        match unit {
            Unit::Days => &self.days,
            Unit::Hours => &self.hours,
            Unit::Minutes => &self.minutes,
            Unit::Seconds => &self.seconds,
        }
    }
}

impl Default for UnitLabels {
    fn default() -> Self {
        Self {
            days: "Días".to_string(),
            hours: "Horas".to_string(),
            minutes: "Minutos".to_string(),
            seconds: "Segundos".to_string(),
        }
    }
}

// ============================================================================
// Memory surface
// ============================================================================

/// One operation applied to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayOp {
    /// Slot text replaced.
    SetText {
        /// Target slot.
        unit: Unit,
        /// New text.
        text: String,
    },
    /// Flip effect started.
    FlipStart {
        /// Target slot.
        unit: Unit,
    },
    /// Flip effect ended.
    FlipEnd {
        /// Target slot.
        unit: Unit,
    },
    /// Countdown region replaced with the arrival message.
    Arrival {
        /// Headline.
        title: String,
        /// Secondary line.
        subtitle: String,
    },
}

/// A recorded operation, stamped when the surface has a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedOp {
    /// Epoch milliseconds at which the operation was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_ms: Option<i64>,
    /// The operation.
    #[serde(flatten)]
    pub op: DisplayOp,
}

/// Headless surface that keeps current state and a log of every operation.
///
/// Used by the `simulate` command and by tests.
#[derive(Default)]
pub struct MemoryDisplay {
    texts: [Option<String>; 4],
    flipping: [bool; 4],
    arrival: Option<ArrivalMessage>,
    missing: BTreeSet<Unit>,
    log: Vec<RecordedOp>,
    clock: Option<Box<dyn Clock + Send>>,
}

impl std::fmt::Debug for MemoryDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDisplay")
            .field("texts", &self.texts)
            .field("flipping", &self.flipping)
            .field("arrival", &self.arrival)
            .field("missing", &self.missing)
            .field("ops", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl MemoryDisplay {
    /// Creates a surface with a slot for every unit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps every recorded operation with `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Removes the slot for `unit`.
    #[must_use]
    pub fn without_target(mut self, unit: Unit) -> Self {
        self.missing.insert(unit);
        self
    }

    /// Adds back the slot for `unit`.
    pub fn restore_target(&mut self, unit: Unit) {
        self.missing.remove(&unit);
    }

    /// Current text of `unit`, if anything was written.
    #[must_use]
    pub fn text(&self, unit: Unit) -> Option<&str> {
        self.texts[unit.index()].as_deref()
    }

    /// Whether the flip effect is on for `unit`.
    #[must_use]
    pub const fn is_flipping(&self, unit: Unit) -> bool {
        self.flipping[unit.index()]
    }

    /// The arrival message, once shown.
    #[must_use]
    pub const fn arrival(&self) -> Option<&ArrivalMessage> {
        self.arrival.as_ref()
    }

    /// Every operation applied so far.
    #[must_use]
    pub fn ops(&self) -> &[RecordedOp] {
        &self.log
    }

    /// Texts written to `unit`, oldest first.
    #[must_use]
    pub fn texts_written(&self, unit: Unit) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|r| match &r.op {
                DisplayOp::SetText { unit: u, text } if *u == unit => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of flips started on `unit`.
    #[must_use]
    pub fn flip_count(&self, unit: Unit) -> usize {
        self.log
            .iter()
            .filter(|r| matches!(r.op, DisplayOp::FlipStart { unit: u } if u == unit))
            .count()
    }

    /// Drops the operation log, keeping current state.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn record(&mut self, op: DisplayOp) {
        let at_ms = self.clock.as_ref().map(|c| c.now_ms());
        self.log.push(RecordedOp { at_ms, op });
    }
}

impl DisplaySurface for MemoryDisplay {
    fn has_target(&self, unit: Unit) -> bool {
        self.arrival.is_none() && !self.missing.contains(&unit)
    }

    fn set_text(&mut self, unit: Unit, text: &str) {
        self.texts[unit.index()] = Some(text.to_string());
        self.record(DisplayOp::SetText {
            unit,
            text: text.to_string(),
        });
    }

    fn set_flipping(&mut self, unit: Unit, flipping: bool) {
        self.flipping[unit.index()] = flipping;
        let op = if flipping {
            DisplayOp::FlipStart { unit }
        } else {
            DisplayOp::FlipEnd { unit }
        };
        self.record(op);
    }

    fn show_arrival(&mut self, message: &ArrivalMessage) {
        self.texts = Default::default();
        self.flipping = [false; 4];
        self.arrival = Some(message.clone());
        self.record(DisplayOp::Arrival {
            title: message.title.clone(),
            subtitle: message.subtitle.clone(),
        });
    }
}

// ============================================================================
// Terminal surface
// ============================================================================

const CLEAR_LINE: &str = "\r\x1b[2K";
const REVERSE: &str = "\x1b[7m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Renders the countdown as a single line on a terminal-like writer.
///
/// With ANSI enabled the line is redrawn in place and flipping units are
/// shown in reverse video. Without ANSI each text change prints a fresh
/// line. Write errors are dropped; a broken pipe must not stop the clock.
pub struct TerminalDisplay<W: Write> {
    out: W,
    labels: UnitLabels,
    ansi: bool,
    texts: [Option<String>; 4],
    flipping: [bool; 4],
    arrived: bool,
}

impl<W: Write> TerminalDisplay<W> {
    /// Creates a terminal surface writing to `out`.
    pub fn new(out: W, labels: UnitLabels, ansi: bool) -> Self {
        Self {
            out,
            labels,
            ansi,
            texts: Default::default(),
            flipping: [false; 4],
            arrived: false,
        }
    }

    /// Consumes the surface and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// The current countdown line without control sequences.
    #[must_use]
    pub fn line(&self) -> String {
        self.compose(false)
    }

    fn compose(&self, styled: bool) -> String {
        Unit::ALL
            .iter()
            .map(|&unit| {
                let text = self.texts[unit.index()].as_deref().unwrap_or("--");
                let label = self.labels.get(unit);
                if styled && self.flipping[unit.index()] {
                    format!("{REVERSE}{text}{RESET} {label}")
                } else {
                    format!("{text} {label}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn redraw(&mut self) {
        let result = if self.ansi {
            let line = self.compose(true);
            write!(self.out, "{CLEAR_LINE}{line}")
        } else {
            let line = self.compose(false);
            writeln!(self.out, "{line}")
        };
        if result.and_then(|()| self.out.flush()).is_err() {
            tracing::trace!("terminal write failed");
        }
    }
}

impl<W: Write> DisplaySurface for TerminalDisplay<W> {
    fn has_target(&self, _unit: Unit) -> bool {
        !self.arrived
    }

    fn set_text(&mut self, unit: Unit, text: &str) {
        self.texts[unit.index()] = Some(text.to_string());
        self.redraw();
    }

    fn set_flipping(&mut self, unit: Unit, flipping: bool) {
        self.flipping[unit.index()] = flipping;
        if self.ansi {
            self.redraw();
        }
    }

    fn show_arrival(&mut self, message: &ArrivalMessage) {
        self.arrived = true;
        let result = if self.ansi {
            writeln!(self.out, "{CLEAR_LINE}{BOLD}{}{RESET}", message.title)
        } else {
            writeln!(self.out, "{}", message.title)
        };
        let result = result.and_then(|()| {
            if message.subtitle.is_empty() {
                Ok(())
            } else {
                writeln!(self.out, "{}", message.subtitle)
            }
        });
        if result.and_then(|()| self.out.flush()).is_err() {
            tracing::trace!("terminal write failed");
        }
    }
}
