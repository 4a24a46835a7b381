//! Block and sub-block records.
//!
//! These mirror the rows the presentation layer loads from the remote store.
//! The engines only read them; nothing in this crate mutates a record except
//! the expansion controller, which flips `is_expanded` in one transition.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::schedule::{Interval, TimelineEntry};
use crate::time::{to_absolute_minutes, ClockTime};

/// Category of a buffer block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    #[default]
    Waiting,
    Travel,
    Break,
    Preparation,
    Transfer,
}

impl BufferKind {
    pub const ALL: [BufferKind; 5] = [
        Self::Waiting,
        Self::Travel,
        Self::Break,
        Self::Preparation,
        Self::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Travel => "travel",
            Self::Break => "break",
            Self::Preparation => "preparation",
            Self::Transfer => "transfer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Travel => "Travel",
            Self::Break => "Break",
            Self::Preparation => "Preparation",
            Self::Transfer => "Transfer",
        }
    }
}

/// A top-level scheduled unit on the event timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub title: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// 0 = primary event day, 1 = the following day.
    #[serde(default)]
    pub day_offset: u32,
    #[serde(default)]
    pub is_buffer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_kind: Option<BufferKind>,
    /// Persisted display order; layout always orders by absolute time.
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_expanded: bool,
}

impl Block {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: ClockTime,
        end_time: ClockTime,
        day_offset: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_time,
            end_time,
            day_offset,
            is_buffer: false,
            buffer_kind: None,
            sort_order: 0,
            is_expanded: false,
        }
    }

    /// Mark this block as a buffer of the given kind.
    pub fn into_buffer(mut self, kind: BufferKind) -> Self {
        self.is_buffer = true;
        self.buffer_kind = Some(kind);
        self
    }

    pub fn absolute_start(&self) -> i64 {
        to_absolute_minutes(self.start_time, self.day_offset)
    }

    pub fn absolute_end(&self) -> i64 {
        to_absolute_minutes(self.end_time, self.day_offset)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.absolute_end() - self.absolute_start()
    }

    /// Check the end-after-start invariant.
    pub fn validate(&self) -> Result<Interval, ScheduleError> {
        Interval::new(self.absolute_start(), self.absolute_end())
    }
}

impl TimelineEntry for Block {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn interval(&self) -> Interval {
        Interval {
            start: self.absolute_start(),
            end: self.absolute_end(),
        }
    }

    fn is_buffer(&self) -> bool {
        self.is_buffer
    }

    fn is_expanded(&self) -> bool {
        self.is_expanded
    }
}

/// A minute-level child activity inside one parent block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBlock {
    pub id: String,
    pub parent_id: String,
    pub title: String,
    /// Minutes after the parent block's start.
    pub offset_minutes: i64,
    pub duration_minutes: i64,
}

impl SubBlock {
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        offset_minutes: i64,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            title: title.into(),
            offset_minutes,
            duration_minutes,
        }
    }

    pub fn end_offset(&self) -> i64 {
        self.offset_minutes + self.duration_minutes
    }

    /// Reject negative offsets and non-positive durations.
    pub fn validate(&self) -> Result<Interval, ScheduleError> {
        if self.offset_minutes < 0 {
            return Err(ScheduleError::InvalidInterval {
                start: self.offset_minutes,
                end: self.end_offset(),
            });
        }
        Interval::new(self.offset_minutes, self.end_offset())
    }
}

impl TimelineEntry for SubBlock {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn interval(&self) -> Interval {
        Interval {
            start: self.offset_minutes,
            end: self.end_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn block_deserializes_with_defaults() {
        let json = r#"{"id":"b1","title":"Ceremony","start_time":"14:00","end_time":"15:00"}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.day_offset, 0);
        assert!(!block.is_buffer);
        assert!(!block.is_expanded);
        assert_eq!(block.duration_minutes(), 60);
    }

    #[test]
    fn block_rejects_malformed_time_on_load() {
        let json = r#"{"id":"b1","title":"x","start_time":"25:00","end_time":"26:00"}"#;
        assert!(serde_json::from_str::<Block>(json).is_err());
    }

    #[test]
    fn next_day_block_sorts_after_primary_day() {
        let late = Block::new("party", "Party", t("22:00"), t("23:30"), 0);
        let after = Block::new("brunch", "Brunch", t("01:00"), t("02:00"), 1);
        assert!(after.absolute_start() > late.absolute_end());
    }

    #[test]
    fn block_validate_rejects_end_before_start() {
        let block = Block::new("b", "Dinner", t("20:00"), t("19:00"), 0);
        assert!(matches!(
            block.validate(),
            Err(ScheduleError::InvalidInterval { start: 1200, end: 1140 })
        ));
    }

    #[test]
    fn sub_block_validation() {
        assert!(SubBlock::new("s", "p", "Toast", 10, 5).validate().is_ok());
        assert!(SubBlock::new("s", "p", "Toast", 10, 0).validate().is_err());
        assert!(SubBlock::new("s", "p", "Toast", -5, 10).validate().is_err());
    }

    #[test]
    fn buffer_kind_serializes_snake_case() {
        let block = Block::new("b", "Drive", t("12:00"), t("12:30"), 0)
            .into_buffer(BufferKind::Travel);
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["buffer_kind"], "travel");
        assert_eq!(json["is_buffer"], true);
    }
}
