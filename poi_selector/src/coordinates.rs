//! Sexagesimal equatorial coordinates.
//!
//! Right ascension is kept as hours/minutes/seconds. Declination is kept as a
//! signed count of arc-seconds, which is what the mount accepts as a target.

use std::fmt;

/// Right ascension as hours, minutes and seconds of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightAscension {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl RightAscension {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Decimal hours, as INDI drivers expect for `EQUATORIAL_EOD_COORD.RA`.
    pub fn to_hours(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0 + self.second as f64 / 3600.0
    }
}

impl fmt::Display for RightAscension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}h{:02}m{:02}s", self.hour, self.minute, self.second)
    }
}

/// Declination as signed total arc-seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Declination(i32);

impl Declination {
    pub fn from_seconds(total_seconds: i32) -> Self {
        Self(total_seconds)
    }

    /// Builds a declination from degree/minute/second parts.
    ///
    /// The sign is taken from `degree` alone, so minutes and seconds always
    /// follow the hemisphere of the degree part. A declination between 0° and
    /// -1° therefore cannot be expressed: `(0, 30, 0)` is +0°30'.
    pub fn from_dms(degree: i16, minute: u8, second: u8) -> Self {
        let magnitude = (60 * (degree as i32).abs() + minute as i32) * 60 + second as i32;
        let sign = if degree < 0 { -1 } else { 1 };
        Self(magnitude * sign)
    }

    pub fn total_seconds(&self) -> i32 {
        self.0
    }

    pub fn to_degrees(&self) -> f64 {
        self.0 as f64 / 3600.0
    }
}

impl fmt::Display for Declination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{:02}*{:02}'{:02}\"",
            sign,
            abs / 3600,
            (abs / 60) % 60,
            abs % 60
        )
    }
}
