//! Display units and remaining-time decomposition.
//!
//! The remaining duration is split into days, hours, minutes and seconds
//! with integer division only, so the decomposition is exact down to the
//! second and never rounds up.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Milliseconds in one second.
pub const MS_PER_SECOND: u64 = 1_000;

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Milliseconds in one day.
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// One of the four countdown slots.
///
/// Variants are declared in render order; [`Unit::ALL`] iterates them
/// the same way a tick updates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Whole days remaining.
    Days,
    /// Hours within the current day.
    Hours,
    /// Minutes within the current hour.
    Minutes,
    /// Seconds within the current minute.
    Seconds,
}

impl Unit {
    /// All units, largest first.
    pub const ALL: [Self; 4] = [Self::Days, Self::Hours, Self::Minutes, Self::Seconds];

    /// Stable lowercase name, used for display slot ids and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
            Self::Seconds => "seconds",
        }
    }

    /// Position of this unit in [`Unit::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Days => 0,
            Self::Hours => 1,
            Self::Minutes => 2,
            Self::Seconds => 3,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A remaining duration split into its four display values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayUnits {
    /// Whole days, unbounded.
    pub days: u64,
    /// `0..24`
    pub hours: u64,
    /// `0..60`
    pub minutes: u64,
    /// `0..60`
    pub seconds: u64,
}

impl DisplayUnits {
    /// Returns the value for a single unit.
    #[must_use]
    pub const fn get(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Days => self.days,
            Unit::Hours => self.hours,
            Unit::Minutes => self.minutes,
            Unit::Seconds => self.seconds,
        }
    }

    /// Reassembles the decomposed value in milliseconds.
    ///
    /// Equals the original remaining duration truncated to whole seconds.
    #[must_use]
    pub const fn total_ms(&self) -> u64 {
        self.days * MS_PER_DAY
            + self.hours * MS_PER_HOUR
            + self.minutes * MS_PER_MINUTE
            + self.seconds * MS_PER_SECOND
    }

    /// Iterates `(unit, value)` pairs in render order.
    pub fn iter(&self) -> impl Iterator<Item = (Unit, u64)> + '_ {
        Unit::ALL.into_iter().map(move |unit| (unit, self.get(unit)))
    }
}

/// Decomposes a non-negative remaining duration in milliseconds.
#[must_use]
pub const fn decompose(remaining_ms: u64) -> DisplayUnits {
    DisplayUnits {
        days: remaining_ms / MS_PER_DAY,
        hours: (remaining_ms % MS_PER_DAY) / MS_PER_HOUR,
        minutes: (remaining_ms % MS_PER_HOUR) / MS_PER_MINUTE,
        seconds: (remaining_ms % MS_PER_MINUTE) / MS_PER_SECOND,
    }
}

/// Formats a unit value for its display slot.
///
/// Values below ten are left-padded to two digits; anything wider is
/// rendered unchanged (`123` stays `"123"`).
#[must_use]
pub fn format_value(value: u64) -> String {
    format!("{value:02}")
}
