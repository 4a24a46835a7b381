//! Minute-level timeline inside one block.
//!
//! Sub-blocks are placed by offset from the parent's start, so the valid
//! range is `[0, parent_duration]`. Running past the parent's end is allowed
//! but reported as a [`SubBlockOverflow`] warning.

use serde::{Deserialize, Serialize};

use super::conflict::{find_overlap, has_overlap, OverlapCheck};
use super::entry::Interval;
use super::gap::{Gap, GapFinder};
use super::layout::{Layout, LayoutConfig, LayoutEngine, TimeMarker};
use crate::block::{Block, SubBlock};
use crate::error::ScheduleError;
use crate::time::{format_with_day_marker, from_absolute_minutes, ClockTime};

/// Canvas settings for a sub-timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubLayoutConfig {
    /// The parent's whole duration is scaled onto this height.
    #[serde(default = "default_canvas_height")]
    pub canvas_height_px: f64,
    #[serde(default = "default_min_block_height")]
    pub min_block_height_px: f64,
    #[serde(default = "default_marker_interval")]
    pub marker_interval_minutes: i64,
}

fn default_canvas_height() -> f64 {
    600.0
}
fn default_min_block_height() -> f64 {
    60.0
}
fn default_marker_interval() -> i64 {
    15
}

impl Default for SubLayoutConfig {
    fn default() -> Self {
        Self {
            canvas_height_px: default_canvas_height(),
            min_block_height_px: default_min_block_height(),
            marker_interval_minutes: default_marker_interval(),
        }
    }
}

/// Advisory warning: a sub-block ends after its parent does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBlockOverflow {
    pub sub_block_id: String,
    pub end_offset: i64,
    pub parent_duration: i64,
}

impl SubBlockOverflow {
    pub fn overflow_minutes(&self) -> i64 {
        self.end_offset - self.parent_duration
    }
}

/// The sub-blocks of one parent block.
#[derive(Debug, Clone)]
pub struct SubTimeline<'a> {
    parent: &'a Block,
    parent_start: i64,
    parent_duration: i64,
    sub_blocks: Vec<&'a SubBlock>,
}

impl<'a> SubTimeline<'a> {
    /// Collect the sub-blocks belonging to `parent` out of `all`.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` if the parent block itself is invalid.
    pub fn new(parent: &'a Block, all: &'a [SubBlock]) -> Result<Self, ScheduleError> {
        let span = parent.validate()?;
        Ok(Self {
            parent,
            parent_start: span.start,
            parent_duration: span.duration_minutes(),
            sub_blocks: all.iter().filter(|s| s.parent_id == parent.id).collect(),
        })
    }

    pub fn parent(&self) -> &Block {
        self.parent
    }

    pub fn parent_duration(&self) -> i64 {
        self.parent_duration
    }

    pub fn sub_blocks(&self) -> &[&'a SubBlock] {
        &self.sub_blocks
    }

    /// Clock time and day offset of a minute inside the parent.
    pub fn clock_time_of(&self, offset_minutes: i64) -> (ClockTime, u32) {
        from_absolute_minutes(self.parent_start + offset_minutes)
    }

    /// Clock label of a minute inside the parent, `(+1)` on the next day.
    pub fn label_of(&self, offset_minutes: i64) -> String {
        format_with_day_marker(self.parent_start + offset_minutes)
    }

    /// Offset at which a new sub-block would naturally go: right after the
    /// last one ends.
    pub fn next_offset(&self) -> i64 {
        self.sub_blocks
            .iter()
            .map(|s| s.end_offset())
            .max()
            .unwrap_or(0)
    }

    pub fn has_overlap(&self, candidate: &Interval, exclude_id: Option<&str>) -> OverlapCheck {
        has_overlap(candidate, &self.sub_blocks, exclude_id)
    }

    pub fn overflow_of(&self, sub_block: &SubBlock) -> Option<SubBlockOverflow> {
        (sub_block.end_offset() > self.parent_duration).then(|| SubBlockOverflow {
            sub_block_id: sub_block.id.clone(),
            end_offset: sub_block.end_offset(),
            parent_duration: self.parent_duration,
        })
    }

    /// Overflow warnings for every stored sub-block.
    pub fn overflows(&self) -> Vec<SubBlockOverflow> {
        self.sub_blocks
            .iter()
            .filter_map(|s| self.overflow_of(s))
            .collect()
    }

    /// Validate a new or edited sub-block.
    ///
    /// Returns the overflow warning, if any, on success. Overflow never
    /// blocks the save.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` for a negative offset or non-positive duration,
    /// `SchedulingConflict` when it overlaps a sibling.
    pub fn validate(&self, candidate: &SubBlock) -> Result<Option<SubBlockOverflow>, ScheduleError> {
        let span = candidate.validate()?;
        if let Some(hit) = find_overlap(&span, &self.sub_blocks, Some(&candidate.id)) {
            return Err(ScheduleError::SchedulingConflict {
                with: hit.id.clone(),
            });
        }
        Ok(self.overflow_of(candidate))
    }

    /// Idle stretches between sub-blocks, as offsets.
    pub fn find_gaps(&self, finder: &GapFinder) -> Result<Vec<Gap>, ScheduleError> {
        finder.find_gaps(&self.sub_blocks)
    }

    /// Scale the parent's duration onto the canvas and place every sub-block
    /// by its offset. Markers fall every `marker_interval_minutes`; gap
    /// affordances use the same `finder` as [`SubTimeline::find_gaps`].
    pub fn layout(
        &self,
        config: &SubLayoutConfig,
        finder: &GapFinder,
    ) -> Result<Layout, ScheduleError> {
        let ppm = self.pixels_per_minute(config);
        let engine = LayoutEngine::new(LayoutConfig {
            pixels_per_minute: ppm,
            min_block_height_px: config.min_block_height_px,
            inter_block_gap_px: 0.0,
            expanded_extra_height: 0.0,
        })
        .with_origin(0)
        .with_gap_finder(finder.clone());

        let mut layout = engine.layout(&self.sub_blocks)?;
        layout.markers = self.markers(config);
        layout.canvas_height = config.canvas_height_px;
        Ok(layout)
    }

    fn pixels_per_minute(&self, config: &SubLayoutConfig) -> f64 {
        config.canvas_height_px / self.parent_duration as f64
    }

    fn markers(&self, config: &SubLayoutConfig) -> Vec<TimeMarker> {
        let ppm = self.pixels_per_minute(config);
        let step = config.marker_interval_minutes.max(1) as usize;
        (0..=self.parent_duration)
            .step_by(step)
            .map(|offset| TimeMarker {
                hour: (self.parent_start + offset).div_euclid(60),
                label: self.label_of(offset),
                top: offset as f64 * ppm,
            })
            .collect()
    }
}
