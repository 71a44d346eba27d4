//! Configuration schema.
//!
//! Mirrors the YAML file layout. Every field is optional; missing values
//! fall back to the defaults below (a wedding invitation countdown with
//! Spanish captions).

use serde::{Deserialize, Serialize};

use crate::countdown::{ArrivalMessage, FlipTiming, UnitLabels};

/// Target used when neither the file nor the command line names one.
pub const DEFAULT_TARGET: &str = "2026-11-17T17:00:00";

/// Default repeating tick period.
pub const DEFAULT_TICK: &str = "1s";

/// Default delay before a flipped unit shows its new text.
pub const DEFAULT_FLIP_TEXT_DELAY: &str = "300ms";

/// Default delay before a flipped unit settles.
pub const DEFAULT_FLIP_SETTLE_DELAY: &str = "600ms";

/// Root of a `flipclock` configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlipclockConfig {
    /// Target and timing.
    pub countdown: CountdownSection,
    /// Message shown after the target passes.
    pub arrival: ArrivalMessage,
    /// Presentation options.
    pub display: DisplaySection,
}

/// `countdown:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountdownSection {
    /// RFC 3339 instant, or a naive date-time interpreted in `timezone`.
    pub target: Option<String>,
    /// Zone for naive targets.
    pub timezone: TimeZoneChoice,
    /// Tick period, e.g. `"1s"`.
    pub tick: Option<String>,
    /// Delay before the new text is shown, e.g. `"300ms"`.
    pub flip_text_delay: Option<String>,
    /// Delay before the flip effect ends, e.g. `"600ms"`.
    pub flip_settle_delay: Option<String>,
    /// Skip the flip effect.
    pub reduced_motion: Option<bool>,
}

/// Zone used to interpret a target without an explicit offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneChoice {
    /// The host's local zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

/// `display:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    /// Captions next to each unit.
    pub labels: UnitLabels,
}

/// Fully resolved settings, ready to build an engine from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSettings {
    /// Target instant in epoch milliseconds.
    pub target_ms: i64,
    /// Tick period and flip delays.
    pub timing: FlipTiming,
    /// Message shown on arrival.
    pub arrival: ArrivalMessage,
    /// Captions next to each unit.
    pub labels: UnitLabels,
}
