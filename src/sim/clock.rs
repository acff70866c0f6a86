//! Wall-clock sources feeding time-of-day rules.

use std::fmt;
use std::time::Duration;

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;
const MILLIS_PER_DAY: u64 = SECONDS_PER_DAY as u64 * 1000;

/// Time of day sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWallTime")]
pub struct WallTime {
    hour: u8,
    minute: u8,
}

#[derive(Deserialize)]
struct RawWallTime {
    hour: u32,
    minute: u32,
}

impl TryFrom<RawWallTime> for WallTime {
    type Error = Error;

    fn try_from(raw: RawWallTime) -> Result<Self> {
        Self::new(raw.hour, raw.minute)
    }
}

impl WallTime {
    /// Creates a time of day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTime`] unless `hour < 24` and `minute < 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(Error::InvalidTime { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Parses `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTime`] for malformed or out-of-range input.
    pub fn parse_hhmm(s: &str) -> Result<Self> {
        let invalid = Error::InvalidTime {
            hour: u32::MAX,
            minute: u32::MAX,
        };
        let Some((h, m)) = s.trim().split_once(':') else {
            return Err(invalid);
        };
        match (h.parse::<u32>(), m.parse::<u32>()) {
            (Ok(h), Ok(m)) => Self::new(h, m),
            _ => Err(invalid),
        }
    }

    pub fn hour(self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minute)
    }

    fn from_seconds_of_day(secs: u32) -> Self {
        let secs = secs % SECONDS_PER_DAY;
        Self {
            hour: (secs / 3600) as u8,
            minute: ((secs % 3600) / 60) as u8,
        }
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Supplies the current time of day to the engine.
pub trait ClockSource {
    /// Samples the clock. Called exactly once per tick.
    fn now(&mut self) -> WallTime;
}

/// Host local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&mut self) -> WallTime {
        let now = Local::now();
        WallTime::from_seconds_of_day(now.num_seconds_from_midnight())
    }
}

/// A simulated clock that advances a fixed step per sample.
///
/// The first call to [`ClockSource::now`] returns the start time; each
/// subsequent call moves forward by the step, wrapping at midnight. Time is
/// tracked in milliseconds so sub-second and fractional-second steps
/// accumulate exactly.
///
/// # Examples
///
/// ```
/// use vpp_benefit_sim::sim::clock::{ClockSource, SteppedClock, WallTime};
///
/// let start = WallTime::new(23, 59).unwrap();
/// let mut clock = SteppedClock::new(start, 60);
/// assert_eq!(clock.now().to_string(), "23:59");
/// assert_eq!(clock.now().to_string(), "00:00");
/// ```
#[derive(Debug, Clone)]
pub struct SteppedClock {
    /// Milliseconds since midnight of the next sample.
    current_ms: u64,
    /// Milliseconds added after every sample, reduced modulo one day.
    step_ms: u64,
}

impl SteppedClock {
    pub fn new(start: WallTime, step_secs: u32) -> Self {
        Self::with_step(start, Duration::from_secs(u64::from(step_secs)))
    }

    /// Clock advancing by `step` per sample, e.g. the configured tick period.
    pub fn with_step(start: WallTime, step: Duration) -> Self {
        let start_secs = u64::from(start.hour() * 3600 + start.minute() * 60);
        Self {
            current_ms: start_secs * 1000,
            step_ms: (step.as_millis() % u128::from(MILLIS_PER_DAY)) as u64,
        }
    }
}

impl ClockSource for SteppedClock {
    fn now(&mut self) -> WallTime {
        let t = WallTime::from_seconds_of_day((self.current_ms / 1000) as u32);
        self.current_ms = (self.current_ms + self.step_ms) % MILLIS_PER_DAY;
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(WallTime::new(24, 0).is_err());
        assert!(WallTime::new(0, 60).is_err());
        assert!(WallTime::new(23, 59).is_ok());
    }

    #[test]
    fn parses_hhmm() {
        let t = WallTime::parse_hhmm("06:45").unwrap();
        assert_eq!((t.hour(), t.minute()), (6, 45));
        assert!(WallTime::parse_hhmm("6h45").is_err());
        assert!(WallTime::parse_hhmm("25:00").is_err());
    }

    #[test]
    fn stepped_clock_advances_in_seconds() {
        let mut clock = SteppedClock::new(WallTime::new(10, 0).unwrap(), 2);
        let samples: Vec<WallTime> = (0..31).map(|_| clock.now()).collect();
        assert!(samples[..30].iter().all(|t| t.minute() == 0));
        assert_eq!(samples[30].minute(), 1);
    }

    #[test]
    fn stepped_clock_wraps_at_midnight() {
        let mut clock = SteppedClock::new(WallTime::new(23, 30).unwrap(), 3600);
        assert_eq!(clock.now().hour(), 23);
        assert_eq!(clock.now().hour(), 0);
        assert_eq!(clock.now().hour(), 1);
    }

    #[test]
    fn sub_second_steps_accumulate() {
        let mut clock =
            SteppedClock::with_step(WallTime::new(10, 0).unwrap(), Duration::from_millis(500));
        let samples: Vec<WallTime> = (0..121).map(|_| clock.now()).collect();
        assert!(samples[..120].iter().all(|t| t.minute() == 0));
        assert_eq!(samples[120].minute(), 1);
    }

    #[test]
    fn fractional_second_steps_are_not_truncated() {
        // 24 steps of 2.5 s = 60 s; truncating to 2 s would need 30
        let mut clock =
            SteppedClock::with_step(WallTime::new(10, 0).unwrap(), Duration::from_millis(2500));
        let samples: Vec<WallTime> = (0..25).map(|_| clock.now()).collect();
        assert_eq!(samples[23].minute(), 0);
        assert_eq!(samples[24].minute(), 1);
    }

    #[test]
    fn deserialize_goes_through_range_check() {
        let t: WallTime = serde_json::from_str(r#"{"hour":6,"minute":45}"#).unwrap();
        assert_eq!(t, WallTime::new(6, 45).unwrap());
        assert!(serde_json::from_str::<WallTime>(r#"{"hour":99,"minute":0}"#).is_err());
        assert!(serde_json::from_str::<WallTime>(r#"{"hour":0,"minute":60}"#).is_err());
    }

    #[test]
    fn system_clock_is_in_range() {
        let t = SystemClock.now();
        assert!(t.hour() < 24 && t.minute() < 60);
    }
}
