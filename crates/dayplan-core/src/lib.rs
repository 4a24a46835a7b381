//! # Dayplan Core Library
//!
//! This library provides the core logic for Dayplan, a day-of-event planner.
//! Users lay out time blocks across one or two calendar days, nest
//! minute-level sub-activities inside each block, and are warned about
//! scheduling conflicts or unplanned idle time. The CLI is a thin layer over
//! the same library.
//!
//! ## Architecture
//!
//! - **Time Model**: `(HH:MM, day_offset)` pairs mapped onto one absolute
//!   minute axis
//! - **Schedule Engine**: overlap detection, gap detection and proportional
//!   layout, for the day and inside each block
//! - **Batched Writes**: a debounced queue that flushes edits to a remote store
//! - **Configuration**: TOML-based engine settings
//!
//! ## Key Components
//!
//! - [`LayoutEngine`]: Render plan for a set of blocks
//! - [`SubTimeline`]: The same algorithms scoped to one block
//! - [`WriteCoordinator`]: Batched, debounced persistence
//! - [`EngineConfig`]: Engine configuration management

pub mod batch;
pub mod block;
pub mod config;
pub mod error;
pub mod plan;
pub mod schedule;
pub mod time;

pub use batch::{
    BatchConfig, FlushReport, MemoryStore, OperationKind, PendingOperation, RemoteStore,
    WriteCoordinator,
};
pub use block::{Block, BufferKind, SubBlock};
pub use config::EngineConfig;
pub use error::{BatchError, ConfigError, CoreError, ScheduleError, StoreError};
pub use plan::DayPlan;
pub use schedule::{
    compute_layout, find_gaps, has_overlap, suggest_next_slot, validate_candidate,
    ExpansionState, Gap, GapFinder, GapSize, Interval, Layout, LayoutConfig, LayoutEngine,
    OverlapCheck, SubBlockOverflow, SubLayoutConfig, SubTimeline,
};
pub use time::{format_duration, from_absolute_minutes, to_absolute_minutes, ClockTime};
