//! Intervals and the common view the engines take of blocks and sub-blocks.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::time::{to_absolute_minutes, ClockTime};

/// Half-open interval `[start, end)` on a minute timeline.
///
/// For top-level blocks the minutes are absolute (day offset applied); for
/// sub-blocks they are offsets from the parent block's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Build an interval, rejecting `end <= start`.
    pub fn new(start: i64, end: i64) -> Result<Self, ScheduleError> {
        if end <= start {
            return Err(ScheduleError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval for a pair of clock times sharing one day offset.
    pub fn from_clock(
        start: ClockTime,
        end: ClockTime,
        day_offset: u32,
    ) -> Result<Self, ScheduleError> {
        Self::new(
            to_absolute_minutes(start, day_offset),
            to_absolute_minutes(end, day_offset),
        )
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end - self.start
    }

    /// `[s1,e1)` and `[s2,e2)` overlap iff `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Anything placed on a timeline: blocks, sub-blocks.
pub trait TimelineEntry {
    fn entry_id(&self) -> &str;

    /// Raw interval as stored; may be inverted for records that were never
    /// validated.
    fn interval(&self) -> Interval;

    fn is_buffer(&self) -> bool {
        false
    }

    fn is_expanded(&self) -> bool {
        false
    }
}

impl<T: TimelineEntry + ?Sized> TimelineEntry for &T {
    fn entry_id(&self) -> &str {
        (**self).entry_id()
    }

    fn interval(&self) -> Interval {
        (**self).interval()
    }

    fn is_buffer(&self) -> bool {
        (**self).is_buffer()
    }

    fn is_expanded(&self) -> bool {
        (**self).is_expanded()
    }
}

/// Entries ordered by start minute.
///
/// The sort is stable, so entries starting at the same minute keep the order
/// they were loaded in (which is their persisted sort order).
pub fn sort_chronologically<T: TimelineEntry>(entries: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = entries.iter().collect();
    sorted.sort_by_key(|e| e.interval().start);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_empty_and_inverted() {
        assert!(Interval::new(10, 20).is_ok());
        assert_eq!(
            Interval::new(20, 20).unwrap_err(),
            ScheduleError::InvalidInterval { start: 20, end: 20 }
        );
        assert!(Interval::new(30, 20).is_err());
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Interval { start: 540, end: 600 };
        let b = Interval { start: 600, end: 660 };
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&Interval { start: 599, end: 601 }));
    }

    #[test]
    fn clock_interval_applies_day_offset() {
        let start = ClockTime::new(0, 30).unwrap();
        let end = ClockTime::new(2, 0).unwrap();
        let interval = Interval::from_clock(start, end, 1).unwrap();
        assert_eq!(interval, Interval { start: 1470, end: 1560 });
    }
}
