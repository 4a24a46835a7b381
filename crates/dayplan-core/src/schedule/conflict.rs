//! Overlap detection for candidate intervals.
//!
//! Buffer blocks are checked exactly like regular blocks. The detector never
//! resolves a conflict; it reports which entry collides so the caller can
//! refuse the save with a specific message.

use serde::{Deserialize, Serialize};

use super::entry::{sort_chronologically, Interval, TimelineEntry};
use crate::block::Block;
use crate::error::ScheduleError;

/// Outcome of an overlap check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapCheck {
    pub conflict: bool,
    /// Id of the first colliding entry in chronological order.
    pub with: Option<String>,
}

/// A pair of entries in a loaded set that overlap each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: String,
    pub second: String,
    pub overlap_minutes: i64,
}

/// First entry (by start time) that overlaps `candidate`, skipping `exclude_id`.
pub fn find_overlap<'a, T: TimelineEntry>(
    candidate: &Interval,
    entries: &'a [T],
    exclude_id: Option<&str>,
) -> Option<&'a T> {
    sort_chronologically(entries)
        .into_iter()
        .filter(|e| exclude_id != Some(e.entry_id()))
        .find(|e| candidate.overlaps(&e.interval()))
}

/// Check `candidate` against every entry except the one being edited.
pub fn has_overlap<T: TimelineEntry>(
    candidate: &Interval,
    entries: &[T],
    exclude_id: Option<&str>,
) -> OverlapCheck {
    match find_overlap(candidate, entries, exclude_id) {
        Some(hit) => OverlapCheck {
            conflict: true,
            with: Some(hit.entry_id().to_string()),
        },
        None => OverlapCheck::default(),
    }
}

/// Validate a proposed `[start, end)` before it is saved.
///
/// # Errors
///
/// `InvalidInterval` when `end <= start`, `SchedulingConflict` naming the
/// colliding entry otherwise.
pub fn validate_candidate<T: TimelineEntry>(
    start: i64,
    end: i64,
    entries: &[T],
    exclude_id: Option<&str>,
) -> Result<Interval, ScheduleError> {
    let candidate = Interval::new(start, end)?;
    match find_overlap(&candidate, entries, exclude_id) {
        Some(hit) => Err(ScheduleError::SchedulingConflict {
            with: hit.entry_id().to_string(),
        }),
        None => Ok(candidate),
    }
}

/// Validate a new or edited block against the rest of the plan.
///
/// The block's own id is excluded, so an edit never collides with the stored
/// version of itself.
pub fn validate_block(candidate: &Block, existing: &[Block]) -> Result<Interval, ScheduleError> {
    validate_candidate(
        candidate.absolute_start(),
        candidate.absolute_end(),
        existing,
        Some(&candidate.id),
    )
}

/// Every overlapping pair in an already loaded set, in chronological order.
pub fn conflicting_pairs<T: TimelineEntry>(entries: &[T]) -> Vec<ConflictPair> {
    let sorted = sort_chronologically(entries);
    let mut pairs = Vec::new();

    for (i, a) in sorted.iter().enumerate() {
        let ia = a.interval();
        for b in sorted[i + 1..].iter() {
            let ib = b.interval();
            if ib.start >= ia.end {
                break;
            }
            if ia.overlaps(&ib) {
                pairs.push(ConflictPair {
                    first: a.entry_id().to_string(),
                    second: b.entry_id().to_string(),
                    overlap_minutes: ia.end.min(ib.end) - ib.start,
                });
            }
        }
    }

    pairs
}
