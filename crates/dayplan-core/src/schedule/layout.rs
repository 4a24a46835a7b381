//! Proportional vertical layout for a timeline.
//!
//! Block height reflects duration. An expanded block grows in place and
//! pushes every later block (and gap affordance, and hour marker) down by
//! `expanded_extra_height`; nothing before it moves.

use serde::{Deserialize, Serialize};

use super::entry::{sort_chronologically, TimelineEntry};
use super::gap::{Gap, GapFinder};
use crate::error::ScheduleError;
use crate::time::format_with_day_marker;

/// Visual density knobs. The engine treats them as plain scale factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_pixels_per_minute")]
    pub pixels_per_minute: f64,
    #[serde(default = "default_min_block_height")]
    pub min_block_height_px: f64,
    /// Space trimmed off each block so neighbours do not touch.
    #[serde(default = "default_inter_block_gap")]
    pub inter_block_gap_px: f64,
    #[serde(default = "default_expanded_extra_height")]
    pub expanded_extra_height: f64,
}

fn default_pixels_per_minute() -> f64 {
    80.0 / 60.0
}
fn default_min_block_height() -> f64 {
    40.0
}
fn default_inter_block_gap() -> f64 {
    4.0
}
fn default_expanded_extra_height() -> f64 {
    700.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pixels_per_minute: default_pixels_per_minute(),
            min_block_height_px: default_min_block_height(),
            inter_block_gap_px: default_inter_block_gap(),
            expanded_extra_height: default_expanded_extra_height(),
        }
    }
}

/// Rendered height of a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockHeight {
    Fixed { px: f64 },
    /// Expanded block: the renderer sizes it to content, at least `min_px`.
    Auto { min_px: f64 },
}

impl BlockHeight {
    /// Smallest height the block will be drawn with.
    pub fn min_px(&self) -> f64 {
        match *self {
            Self::Fixed { px } => px,
            Self::Auto { min_px } => min_px,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto { .. })
    }
}

/// Position of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub block_id: String,
    pub top: f64,
    pub height: BlockHeight,
    pub start: i64,
    pub end: i64,
    pub is_buffer: bool,
}

/// A gap rendered as a "fill with buffer" affordance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAffordance {
    pub gap: Gap,
    pub top: f64,
    pub height: f64,
}

/// An hour tick on the time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMarker {
    /// Hours since midnight of the primary day (25 = 01:00 next day).
    pub hour: i64,
    /// `HH:00`, with `(+1)` on the following day.
    pub label: String,
    pub top: f64,
}

/// Complete render plan for one timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub entries: Vec<LayoutEntry>,
    pub gaps: Vec<GapAffordance>,
    pub markers: Vec<TimeMarker>,
    /// Minute every top is measured from: the earliest start, unless the
    /// engine was given a fixed origin.
    pub min_start: i64,
    /// Total push-down accumulated from expanded entries.
    pub final_offset: f64,
    /// Height the container needs, expansion included.
    pub canvas_height: f64,
}

impl Layout {
    pub fn entry(&self, id: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.block_id == id)
    }
}

#[derive(Default)]
struct Fold {
    entries: Vec<LayoutEntry>,
    gaps: Vec<GapAffordance>,
    offset: f64,
}

/// Computes layouts with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    gap_finder: GapFinder,
    origin: Option<i64>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            gap_finder: GapFinder::new(),
            origin: None,
        }
    }

    /// Measure tops from a fixed minute instead of the earliest start.
    pub fn with_origin(mut self, origin: i64) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_gap_finder(mut self, gap_finder: GapFinder) -> Self {
        self.gap_finder = gap_finder;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `entries` (any order) with gap affordances and hour markers.
    ///
    /// # Errors
    ///
    /// `Inconsistent` when two consecutive entries overlap.
    pub fn layout<T: TimelineEntry>(&self, entries: &[T]) -> Result<Layout, ScheduleError> {
        let sorted = sort_chronologically(entries);
        let Some(first) = sorted.first() else {
            return Ok(Layout::default());
        };
        let min_start = self.origin.unwrap_or(first.interval().start);
        let ppm = self.config.pixels_per_minute;

        let fold = sorted
            .iter()
            .enumerate()
            .try_fold(Fold::default(), |mut acc, (i, entry)| {
                let span = entry.interval();
                let top = (span.start - min_start) as f64 * ppm + acc.offset;
                let base = (span.duration_minutes() as f64 * ppm - self.config.inter_block_gap_px)
                    .max(self.config.min_block_height_px)
                    .max(0.0);

                let height = if entry.is_expanded() {
                    acc.offset += self.config.expanded_extra_height;
                    BlockHeight::Auto {
                        min_px: base + self.config.expanded_extra_height,
                    }
                } else {
                    BlockHeight::Fixed { px: base }
                };

                acc.entries.push(LayoutEntry {
                    block_id: entry.entry_id().to_string(),
                    top,
                    height,
                    start: span.start,
                    end: span.end,
                    is_buffer: entry.is_buffer(),
                });

                if let Some(next) = sorted.get(i + 1) {
                    if let Some(gap) = self.gap_finder.gap_between(*entry, *next)? {
                        acc.gaps.push(GapAffordance {
                            top: (gap.start - min_start) as f64 * ppm + acc.offset,
                            height: gap.duration_minutes() as f64 * ppm,
                            gap,
                        });
                    }
                }

                Ok::<_, ScheduleError>(acc)
            })?;

        let max_end = sorted
            .iter()
            .map(|e| e.interval().end)
            .max()
            .unwrap_or(min_start);
        let max_hour = (max_end + 60 + 59).div_euclid(60);
        let markers = self.markers(&sorted, min_start, max_hour);
        let canvas_height = (max_hour * 60 - min_start) as f64 * ppm + fold.offset;

        Ok(Layout {
            entries: fold.entries,
            gaps: fold.gaps,
            markers,
            min_start,
            final_offset: fold.offset,
            canvas_height,
        })
    }

    /// One marker per full hour from the first block's start to an hour past
    /// the last block's end.
    fn markers<T: TimelineEntry>(
        &self,
        sorted: &[&T],
        min_start: i64,
        max_hour: i64,
    ) -> Vec<TimeMarker> {
        let first_hour = (min_start + 59).div_euclid(60);
        let ppm = self.config.pixels_per_minute;

        (first_hour..=max_hour)
            .map(|hour| {
                let minute = hour * 60;
                let expanded_before = sorted
                    .iter()
                    .filter(|e| e.is_expanded() && e.interval().start < minute)
                    .count();
                TimeMarker {
                    hour,
                    label: format_with_day_marker(minute),
                    top: (minute - min_start) as f64 * ppm
                        + expanded_before as f64 * self.config.expanded_extra_height,
                }
            })
            .collect()
    }
}

/// Convenience function to lay out with the given configuration
pub fn compute_layout<T: TimelineEntry>(
    entries: &[T],
    config: &LayoutConfig,
) -> Result<Layout, ScheduleError> {
    LayoutEngine::new(config.clone()).layout(entries)
}
