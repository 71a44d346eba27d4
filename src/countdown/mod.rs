//! Countdown engine.
//!
//! Counts down to a fixed instant, splitting the remaining time into
//! days, hours, minutes and seconds, and animates each unit whose value
//! changes with a short flip effect.
//!
//! # Architecture
//!
//! - [`Clock`] - wall-clock source (`SystemClock`, virtual `ManualClock`)
//! - [`units`] - exact integer decomposition and slot formatting
//! - [`flip`] - per-unit `Idle -> Animating -> Idle` tracking
//! - [`timers`] - repeating tick and deferred flip callbacks
//! - [`DisplaySurface`] - where the countdown renders
//! - [`CountdownEngine`] - ties the above together

pub mod clock;
pub mod display;
pub mod engine;
pub mod flip;
pub mod timers;
pub mod units;

pub use clock::{Clock, ManualClock, SystemClock};
pub use display::{ArrivalMessage, DisplaySurface, MemoryDisplay, TerminalDisplay, UnitLabels};
pub use engine::{
    CountdownEngine, EngineState, EngineStats, FlipTiming, Motion, PollOutcome, TickOutcome,
    UnitUpdate,
};
pub use flip::FlipState;
pub use units::{DisplayUnits, Unit, decompose, format_value};
