//! Day-schedule engine.
//!
//! This module provides:
//! - Overlap detection for new and edited blocks
//! - Gap detection between blocks, for buffer insertion
//! - Proportional layout with in-place expansion
//! - The same algorithms scoped to one block's sub-timeline
//!
//! Everything here is pure: no I/O, no shared state.

mod conflict;
mod entry;
mod expansion;
mod gap;
mod layout;
mod sub_timeline;
mod suggest;

pub use conflict::{
    conflicting_pairs, find_overlap, has_overlap, validate_block, validate_candidate,
    ConflictPair, OverlapCheck,
};
pub use entry::{sort_chronologically, Interval, TimelineEntry};
pub use expansion::{ExpansionState, FlagChange};
pub use gap::{find_gaps, Gap, GapFinder, GapSize, DEFAULT_MIN_GAP_MINUTES};
pub use layout::{
    compute_layout, BlockHeight, GapAffordance, Layout, LayoutConfig, LayoutEngine, LayoutEntry,
    TimeMarker,
};
pub use sub_timeline::{SubBlockOverflow, SubLayoutConfig, SubTimeline};
pub use suggest::{suggest_next_slot, SlotSuggestion};
