//! Default times for a newly created block.

use serde::{Deserialize, Serialize};

use super::entry::Interval;
use crate::block::Block;
use crate::time::{to_absolute_minutes, ClockTime};

const EMPTY_PLAN_START: i64 = 10 * 60;
const EMPTY_PLAN_END: i64 = 12 * 60;
const LEAD_MINUTES: i64 = 30;
const SUGGESTED_DURATION: i64 = 2 * 60;
const LATEST_START: i64 = 23 * 60 + 30;
const LAST_MINUTE: i64 = 23 * 60 + 59;

/// Proposed start and end for a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSuggestion {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub day_offset: u32,
}

impl SlotSuggestion {
    fn from_local(start: i64, end: i64, day_offset: u32) -> Self {
        let clock = |m: i64| {
            // both values are clamped to the same day before this point
            ClockTime::new((m / 60) as u32, (m % 60) as u32).unwrap_or(ClockTime::MIDNIGHT)
        };
        Self {
            start_time: clock(start),
            end_time: clock(end),
            day_offset,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval {
            start: to_absolute_minutes(self.start_time, self.day_offset),
            end: to_absolute_minutes(self.end_time, self.day_offset),
        }
    }

    pub fn into_block(self, id: impl Into<String>, title: impl Into<String>) -> Block {
        Block::new(id, title, self.start_time, self.end_time, self.day_offset)
    }
}

/// Suggest a two hour slot starting half an hour after the latest block.
///
/// An empty plan gets 10:00-12:00 on the primary day. The start never moves
/// past 23:30 and the end never past 23:59 of the latest block's day, so the
/// suggestion can collide with a block that runs until midnight; callers
/// validate it like any other candidate.
pub fn suggest_next_slot(blocks: &[Block]) -> SlotSuggestion {
    let Some(latest) = blocks.iter().max_by_key(|b| b.absolute_end()) else {
        return SlotSuggestion::from_local(EMPTY_PLAN_START, EMPTY_PLAN_END, 0);
    };

    let start = (latest.end_time.minutes_from_midnight() + LEAD_MINUTES).min(LATEST_START);
    let end = (start + SUGGESTED_DURATION).min(LAST_MINUTE);
    SlotSuggestion::from_local(start, end, latest.day_offset)
}
