//! Wall-clock times and the absolute-minute timeline.
//!
//! A block's start and end are stored as a time of day plus a day offset.
//! Everything that compares or measures blocks works on absolute minutes:
//! `day_offset * 1440 + hour * 60 + minute`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScheduleError;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A time of day with minute precision (`HH:MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };

    /// Build a time of day, rejecting `hour >= 24` or `minute >= 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour >= 24 {
            return Err(ScheduleError::invalid_time(
                format!("{hour}:{minute:02}"),
                "hour must be below 24",
            ));
        }
        if minute >= 60 {
            return Err(ScheduleError::invalid_time(
                format!("{hour}:{minute:02}"),
                "minute must be below 60",
            ));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Convert a chrono time, dropping seconds.
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minute)
    }

    /// Minutes elapsed since midnight of the same day.
    pub fn minutes_from_midnight(&self) -> i64 {
        i64::from(self.hour) * 60 + i64::from(self.minute)
    }

    fn from_minute_of_day(minute_of_day: i64) -> Self {
        let m = minute_of_day.rem_euclid(MINUTES_PER_DAY);
        Self {
            hour: (m / 60) as u8,
            minute: (m % 60) as u8,
        }
    }
}

impl FromStr for ClockTime {
    type Err = ScheduleError;

    /// Parses `HH:MM`; a trailing `:SS` (as stored by SQL `time` columns) is
    /// accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self::from_naive)
            .map_err(|e| ScheduleError::invalid_time(s, e.to_string()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Place a time of day on the absolute-minute timeline.
pub fn to_absolute_minutes(time: ClockTime, day_offset: u32) -> i64 {
    i64::from(day_offset) * MINUTES_PER_DAY + time.minutes_from_midnight()
}

/// Parse `HH:MM` and place it on the absolute-minute timeline.
pub fn parse_absolute_minutes(time: &str, day_offset: u32) -> Result<i64, ScheduleError> {
    Ok(to_absolute_minutes(time.parse()?, day_offset))
}

/// Split an absolute minute back into a time of day and its day offset.
///
/// Values before the primary day wrap around the clock and report day 0;
/// day offsets beyond `u32::MAX` saturate.
pub fn from_absolute_minutes(minutes: i64) -> (ClockTime, u32) {
    let day = u32::try_from(minutes.div_euclid(MINUTES_PER_DAY).max(0)).unwrap_or(u32::MAX);
    (ClockTime::from_minute_of_day(minutes), day)
}

/// Clock label for an absolute minute with a `(+N)` marker for later days.
pub fn format_with_day_marker(minutes: i64) -> String {
    match from_absolute_minutes(minutes) {
        (time, 0) => time.to_string(),
        (time, day) => format!("{time} (+{day})"),
    }
}

/// Human duration such as `1h 30min`, `2h` or `45min`.
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}
