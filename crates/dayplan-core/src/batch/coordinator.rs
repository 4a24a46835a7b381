//! Debounced write coordinator.
//!
//! Edits are queued locally and flushed to a [`RemoteStore`] either when the
//! queue reaches `batch_size` or after `flush_interval_ms` without a new
//! enqueue. A flush groups operations by collection, sends all inserts of a
//! collection as one call, and sends updates and deletes one by one.
//!
//! Delivery is at-least-once: an operation leaves the queue only once the
//! store acknowledged it. Anything that failed goes back to the front of the
//! queue in its original order and a retry is scheduled.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::operation::{OperationKind, PendingOperation};
use super::store::RemoteStore;
use crate::error::{BatchError, StoreError};

/// Flush thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Queue length that triggers an immediate flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Idle time after the last enqueue before a flush.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

fn default_batch_size() -> usize {
    50
}

fn default_flush_interval_ms() -> u64 {
    2000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

impl BatchConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

/// Outcome of a flush that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Operations taken off the queue and acknowledged by the store.
    pub attempted: usize,
    /// Another flush was already running; nothing was done.
    pub skipped: bool,
}

impl FlushReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct Queued {
    seq: u64,
    op: PendingOperation,
}

#[derive(Debug, Default)]
struct QueueState {
    queue: VecDeque<Queued>,
    next_seq: u64,
    timer: Option<JoinHandle<()>>,
    timer_generation: u64,
}

impl QueueState {
    fn cancel_timer(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared<S> {
    store: S,
    config: BatchConfig,
    state: Mutex<QueueState>,
    processing: AtomicBool,
    runtime: Handle,
}

/// Clears the processing flag even if the flush future is dropped.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Batched, debounced writer in front of a [`RemoteStore`].
///
/// Cheap to clone; clones share one queue.
pub struct WriteCoordinator<S: RemoteStore> {
    shared: Arc<Shared<S>>,
}

impl<S: RemoteStore> Clone for WriteCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: RemoteStore> WriteCoordinator<S> {
    /// Create a coordinator whose timers run on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `NoRuntime` when called outside a tokio runtime.
    pub fn new(store: S, config: BatchConfig) -> Result<Self, BatchError> {
        let runtime = Handle::try_current().map_err(|_| BatchError::NoRuntime)?;
        Ok(Self {
            shared: Arc::new(Shared {
                store,
                config,
                state: Mutex::new(QueueState::default()),
                processing: AtomicBool::new(false),
                runtime,
            }),
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.shared.config
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an operation. Never blocks on the store.
    ///
    /// Reaching `batch_size` starts a flush right away; otherwise the idle
    /// timer is restarted.
    pub fn enqueue(&self, op: PendingOperation) {
        let len = {
            let mut state = self.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            tracing::debug!(
                collection = op.collection(),
                kind = ?op.kind(),
                seq,
                "queued write"
            );
            state.queue.push_back(Queued { seq, op });
            state.queue.len()
        };

        if len >= self.shared.config.batch_size {
            self.spawn_flush();
        } else {
            self.schedule_flush();
        }
    }

    /// Number of operations waiting to be flushed.
    pub fn queue_size(&self) -> usize {
        self.lock().queue.len()
    }

    /// Snapshot of the queue, in flush order.
    pub fn pending(&self) -> Vec<PendingOperation> {
        self.lock().queue.iter().map(|q| q.op.clone()).collect()
    }

    pub fn is_processing(&self) -> bool {
        self.shared.processing.load(Ordering::Acquire)
    }

    /// Drop every queued operation and cancel the idle timer.
    ///
    /// Returns how many operations were discarded. A flush already in
    /// flight is not interrupted.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        state.cancel_timer();
        let discarded = state.queue.len();
        state.queue.clear();
        if discarded > 0 {
            tracing::info!(discarded, "cleared write queue");
        }
        discarded
    }

    /// Restart the idle timer.
    fn schedule_flush(&self) {
        let mut state = self.lock();
        state.cancel_timer();
        let generation = state.timer_generation;
        let this = self.clone();
        let interval = self.shared.config.flush_interval();

        state.timer = Some(self.shared.runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            let fire = {
                let mut state = this.lock();
                if state.timer_generation == generation {
                    // Detach before flushing so the flush cannot abort us.
                    state.timer = None;
                    true
                } else {
                    false
                }
            };
            if fire {
                this.flush_logged().await;
            }
        }));
    }

    fn spawn_flush(&self) {
        let this = self.clone();
        self.shared.runtime.spawn(async move {
            this.flush_logged().await;
        });
    }

    async fn flush_logged(&self) {
        if let Err(e) = self.flush().await {
            tracing::warn!(error = %e, "background flush failed, retry scheduled");
        }
    }

    /// Send everything queued to the store now.
    ///
    /// Returns immediately with a skipped report if another flush is running.
    /// On failure the unacknowledged operations are already back in the
    /// queue and a retry is scheduled.
    ///
    /// # Errors
    ///
    /// `FlushFailure` carrying the first store error, if any operation failed.
    pub async fn flush(&self) -> Result<FlushReport, BatchError> {
        if self.shared.processing.swap(true, Ordering::AcqRel) {
            tracing::debug!("flush already in progress");
            return Ok(FlushReport::skipped());
        }
        let _guard = ProcessingGuard(&self.shared.processing);

        let batch: Vec<Queued> = {
            let mut state = self.lock();
            if state.queue.is_empty() {
                return Ok(FlushReport::default());
            }
            state.cancel_timer();
            state.queue.drain(..).collect()
        };
        let attempted = batch.len();

        let outcome = apply_batch(&self.shared.store, &batch).await;
        let failed = outcome.failed.len();

        if failed > 0 {
            let mut state = self.lock();
            let retry: Vec<Queued> = batch
                .into_iter()
                .filter(|q| outcome.failed.contains(&q.seq))
                .collect();
            for queued in retry.into_iter().rev() {
                state.queue.push_front(queued);
            }
        }

        drop(_guard);
        if self.queue_size() > 0 {
            self.schedule_flush();
        }

        match outcome.first_error {
            Some(source) => {
                tracing::warn!(attempted, failed, error = %source, "flush incomplete");
                Err(BatchError::FlushFailure {
                    attempted,
                    failed,
                    source,
                })
            }
            None => {
                tracing::info!(acknowledged = attempted, "flushed write batch");
                Ok(FlushReport {
                    attempted,
                    skipped: false,
                })
            }
        }
    }
}

#[derive(Default)]
struct BatchOutcome {
    failed: HashSet<u64>,
    first_error: Option<StoreError>,
}

impl BatchOutcome {
    fn record(&mut self, seqs: impl IntoIterator<Item = u64>, result: Result<(), StoreError>) {
        if let Err(e) = result {
            self.failed.extend(seqs);
            self.first_error.get_or_insert(e);
        }
    }
}

/// Apply one drained batch. A failure never stops the remaining calls.
async fn apply_batch<S: RemoteStore>(store: &S, batch: &[Queued]) -> BatchOutcome {
    let mut groups: IndexMap<&str, Vec<&Queued>> = IndexMap::new();
    for queued in batch {
        groups.entry(queued.op.collection()).or_default().push(queued);
    }

    let mut outcome = BatchOutcome::default();
    for (collection, ops) in groups {
        let (inserts, rows): (Vec<u64>, Vec<_>) = ops
            .iter()
            .filter_map(|q| match &q.op {
                PendingOperation::Insert { payload, .. } => Some((q.seq, payload.clone())),
                _ => None,
            })
            .unzip();
        if !rows.is_empty() {
            let result = store.insert_many(collection, rows).await;
            if let Err(e) = &result {
                tracing::warn!(collection, rows = inserts.len(), error = %e, "batch insert failed");
            }
            outcome.record(inserts, result);
        }

        for queued in ops.iter().filter(|q| q.op.kind() == OperationKind::Update) {
            if let PendingOperation::Update { id, payload, .. } = &queued.op {
                let result = store.update(collection, id, payload.clone()).await;
                if let Err(e) = &result {
                    tracing::warn!(collection, id = %id, error = %e, "update failed");
                }
                outcome.record([queued.seq], result);
            }
        }

        for queued in ops.iter().filter(|q| q.op.kind() == OperationKind::Delete) {
            if let PendingOperation::Delete { id, .. } = &queued.op {
                let result = store.delete(collection, id).await;
                if let Err(e) = &result {
                    tracing::warn!(collection, id = %id, error = %e, "delete failed");
                }
                outcome.record([queued.seq], result);
            }
        }
    }
    outcome
}
