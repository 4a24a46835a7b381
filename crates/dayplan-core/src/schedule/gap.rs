//! Idle-time detection between adjacent blocks.
//!
//! Finds the gaps a planner may want to fill with a buffer block. No gap is
//! offered next to an existing buffer, and gaps shorter than the configured
//! minimum are ignored.

use serde::{Deserialize, Serialize};

use super::entry::{sort_chronologically, TimelineEntry};
use crate::block::{Block, BufferKind};
use crate::error::ScheduleError;
use crate::time::{format_duration, from_absolute_minutes};

/// Minimum idle time (minutes) worth offering a buffer for.
pub const DEFAULT_MIN_GAP_MINUTES: i64 = 15;

/// Size category of a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSize {
    Small,  // under 30 minutes
    Medium, // 30-59 minutes
    Large,  // 60+ minutes
}

impl GapSize {
    /// Categorize a gap by its duration in minutes
    pub fn from_minutes(minutes: i64) -> Self {
        if minutes < 30 {
            Self::Small
        } else if minutes < 60 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Idle time between two adjacent non-buffer entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: i64,
    pub end: i64,
    pub size: GapSize,
    /// Entry the gap follows.
    pub previous_id: String,
    /// Entry the gap precedes.
    pub next_id: String,
}

impl Gap {
    pub fn duration_minutes(&self) -> i64 {
        self.end - self.start
    }

    /// Label such as `1h 30min`.
    pub fn duration_label(&self) -> String {
        format_duration(self.duration_minutes())
    }

    /// Check if this gap can fit an activity of the given length
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes() >= minutes
    }

    /// A buffer block covering exactly this gap.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` when the gap crosses midnight, since a block's start
    /// and end share one day offset.
    pub fn to_buffer_block(
        &self,
        id: impl Into<String>,
        title: impl Into<String>,
        kind: BufferKind,
    ) -> Result<Block, ScheduleError> {
        let (start_time, start_day) = from_absolute_minutes(self.start);
        let (end_time, end_day) = from_absolute_minutes(self.end);
        if start_day != end_day {
            return Err(ScheduleError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(Block::new(id, title, start_time, end_time, start_day).into_buffer(kind))
    }
}

/// Detector for gaps in a timeline
#[derive(Debug, Clone)]
pub struct GapFinder {
    min_gap_minutes: i64,
}

impl GapFinder {
    /// Create a finder with the default 15 minute threshold
    pub fn new() -> Self {
        Self {
            min_gap_minutes: DEFAULT_MIN_GAP_MINUTES,
        }
    }

    /// Set the minimum gap duration
    pub fn with_min_gap(mut self, minutes: i64) -> Self {
        self.min_gap_minutes = minutes;
        self
    }

    pub fn min_gap_minutes(&self) -> i64 {
        self.min_gap_minutes
    }

    /// Gaps between consecutive entries, in chronological order.
    ///
    /// Entries are sorted by start first, so callers may pass them in any
    /// order.
    ///
    /// # Errors
    ///
    /// `Inconsistent` when two consecutive entries overlap; overlaps should
    /// have been rejected before they were saved.
    pub fn find_gaps<T: TimelineEntry>(&self, entries: &[T]) -> Result<Vec<Gap>, ScheduleError> {
        let sorted = sort_chronologically(entries);
        let mut gaps = Vec::new();

        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if let Some(gap) = self.gap_between(a, b)? {
                gaps.push(gap);
            }
        }

        Ok(gaps)
    }

    /// Gap between two entries already known to be adjacent in time order.
    pub(crate) fn gap_between<T: TimelineEntry>(
        &self,
        a: &T,
        b: &T,
    ) -> Result<Option<Gap>, ScheduleError> {
        let a_end = a.interval().end;
        let b_start = b.interval().start;
        let idle = b_start - a_end;

        if idle < 0 {
            return Err(ScheduleError::Inconsistent {
                earlier: a.entry_id().to_string(),
                later: b.entry_id().to_string(),
                overlap_minutes: -idle,
            });
        }
        if a.is_buffer() || b.is_buffer() || idle < self.min_gap_minutes {
            return Ok(None);
        }

        Ok(Some(Gap {
            start: a_end,
            end: b_start,
            size: GapSize::from_minutes(idle),
            previous_id: a.entry_id().to_string(),
            next_id: b.entry_id().to_string(),
        }))
    }
}

impl Default for GapFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to find gaps with default settings
pub fn find_gaps<T: TimelineEntry>(entries: &[T]) -> Result<Vec<Gap>, ScheduleError> {
    GapFinder::new().find_gaps(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ClockTime;
    use proptest::prelude::*;

    fn block(id: &str, start: &str, end: &str, day: u32) -> Block {
        Block::new(id, id, start.parse().unwrap(), end.parse().unwrap(), day)
    }

    #[test]
    fn test_gap_size_classification() {
        assert_eq!(GapSize::from_minutes(15), GapSize::Small);
        assert_eq!(GapSize::from_minutes(29), GapSize::Small);
        assert_eq!(GapSize::from_minutes(30), GapSize::Medium);
        assert_eq!(GapSize::from_minutes(59), GapSize::Medium);
        assert_eq!(GapSize::from_minutes(60), GapSize::Large);
    }

    #[test]
    fn half_hour_between_two_blocks() {
        let blocks = vec![
            block("a", "09:00", "10:00", 0),
            block("b", "10:30", "11:00", 0),
        ];
        let gaps = find_gaps(&blocks).unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!((gaps[0].start, gaps[0].end), (600, 630));
        assert_eq!(gaps[0].size, GapSize::Medium);
        assert_eq!(gaps[0].previous_id, "a");
        assert_eq!(gaps[0].next_id, "b");
        assert_eq!(gaps[0].duration_label(), "30min");
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let blocks = vec![
            block("late", "13:00", "14:00", 0),
            block("early", "09:00", "10:00", 0),
        ];
        let gaps = find_gaps(&blocks).unwrap();
        assert_eq!(gaps[0].previous_id, "early");
        assert_eq!(gaps[0].duration_minutes(), 180);
    }

    #[test]
    fn degenerate_inputs_yield_nothing() {
        assert!(find_gaps::<Block>(&[]).unwrap().is_empty());
        assert!(find_gaps(&[block("a", "09:00", "10:00", 0)]).unwrap().is_empty());
        let back_to_back = vec![
            block("a", "09:00", "10:00", 0),
            block("b", "10:00", "11:00", 0),
        ];
        assert!(find_gaps(&back_to_back).unwrap().is_empty());
    }

    #[test]
    fn short_idle_time_is_ignored() {
        let blocks = vec![
            block("a", "09:00", "10:00", 0),
            block("b", "10:14", "11:00", 0),
        ];
        assert!(find_gaps(&blocks).unwrap().is_empty());
        let custom = GapFinder::new().with_min_gap(10);
        assert_eq!(custom.find_gaps(&blocks).unwrap().len(), 1);
    }

    #[test]
    fn no_gap_offered_next_to_buffers() {
        let blocks = vec![
            block("a", "09:00", "10:00", 0),
            block("wait", "10:30", "11:00", 0).into_buffer(BufferKind::Waiting),
            block("b", "12:00", "13:00", 0),
            block("c", "14:00", "15:00", 0),
        ];
        let gaps = find_gaps(&blocks).unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].previous_id, "b");
    }

    #[test]
    fn gap_across_midnight_uses_day_offset() {
        let blocks = vec![
            block("party", "22:00", "23:30", 0),
            block("afterparty", "00:30", "02:00", 1),
        ];
        let gaps = find_gaps(&blocks).unwrap();
        assert_eq!((gaps[0].start, gaps[0].end), (1410, 1470));
        assert!(gaps[0].to_buffer_block("x", "Drive", BufferKind::Travel).is_err());
    }

    #[test]
    fn overlap_is_reported_as_inconsistent() {
        let blocks = vec![
            block("a", "09:00", "10:00", 0),
            block("b", "09:45", "11:00", 0),
        ];
        assert_eq!(
            find_gaps(&blocks).unwrap_err(),
            ScheduleError::Inconsistent {
                earlier: "a".into(),
                later: "b".into(),
                overlap_minutes: 15,
            }
        );
    }

    #[test]
    fn buffer_block_fills_gap_exactly() {
        let blocks = vec![
            block("a", "09:00", "10:00", 0),
            block("b", "10:45", "11:00", 0),
        ];
        let gap = &find_gaps(&blocks).unwrap()[0];
        let buffer = gap.to_buffer_block("buf", "Coffee", BufferKind::Break).unwrap();
        assert_eq!(buffer.start_time, ClockTime::new(10, 0).unwrap());
        assert_eq!(buffer.end_time, ClockTime::new(10, 45).unwrap());
        assert!(buffer.is_buffer);
        assert_eq!(buffer.buffer_kind, Some(BufferKind::Break));

        let mut filled = blocks.clone();
        filled.push(buffer);
        assert!(find_gaps(&filled).unwrap().is_empty());
    }

    fn arb_day() -> impl Strategy<Value = Vec<Block>> {
        prop::collection::vec((0i64..90, 1i64..90, any::<bool>()), 0..12).prop_map(|specs| {
            let mut cursor = 0i64;
            let mut blocks = Vec::new();
            for (i, (idle, len, buffer)) in specs.into_iter().enumerate() {
                let start = cursor + idle;
                let end = start + len;
                if end >= 1440 {
                    break;
                }
                let s = ClockTime::new((start / 60) as u32, (start % 60) as u32).unwrap();
                let e = ClockTime::new((end / 60) as u32, (end % 60) as u32).unwrap();
                let mut b = Block::new(format!("b{i}"), "x", s, e, 0);
                b.is_buffer = buffer;
                blocks.push(b);
                cursor = end;
            }
            blocks
        })
    }

    proptest! {
        #[test]
        fn gaps_are_long_enough_and_never_touch_buffers(blocks in arb_day()) {
            let gaps = find_gaps(&blocks).unwrap();
            for gap in &gaps {
                prop_assert!(gap.duration_minutes() >= DEFAULT_MIN_GAP_MINUTES);
                for b in &blocks {
                    let touches = b.absolute_end() == gap.start || b.absolute_start() == gap.end;
                    if touches {
                        prop_assert!(!b.is_buffer);
                    }
                }
            }
        }
    }
}
