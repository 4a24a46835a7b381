//! Batched, debounced writes to a remote store.
//!
//! High-frequency edits (drags, expansion toggles, inline edits) are queued
//! as [`PendingOperation`]s and sent in batches by a [`WriteCoordinator`].

mod coordinator;
mod memory;
mod operation;
mod store;

pub use coordinator::{BatchConfig, FlushReport, WriteCoordinator};
pub use memory::MemoryStore;
pub use operation::{OperationKind, PendingOperation};
pub use store::RemoteStore;
