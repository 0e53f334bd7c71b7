// # Host Integration Helpers
//
// Stock implementations of the host traits.
//
// - `QueuedExecutor`: callbacks are queued and drained by the host loop,
//   once per frame (`HostQueue::run_pending`) or as they arrive
//   (`HostQueue::run_next`).
// - `ContextSlot`: the host's current dungeon context, forgotten whenever
//   the coordinator clears its cache.

use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use crate::model::DungeonContext;
use crate::traits::{ClearListener, HostExecutor, HostTask};

/// Executor that queues tasks for a [`HostQueue`]
///
/// # Example
///
/// ```rust
/// use pfstats_core::host::QueuedExecutor;
/// use pfstats_core::traits::HostExecutor;
///
/// let (executor, mut queue) = QueuedExecutor::new();
/// executor.execute(Box::new(|| println!("on the host")));
///
/// // Later, from the host loop
/// assert_eq!(queue.run_pending(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QueuedExecutor {
    tx: mpsc::UnboundedSender<HostTask>,
}

impl QueuedExecutor {
    /// Create an executor and the queue the host drains
    pub fn new() -> (Self, HostQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, HostQueue { rx })
    }
}

impl HostExecutor for QueuedExecutor {
    fn execute(&self, task: HostTask) {
        if self.tx.send(task).is_err() {
            debug!("Host queue dropped, discarding task");
        }
    }
}

/// Receiving half of a [`QueuedExecutor`], owned by the host loop
pub struct HostQueue {
    rx: mpsc::UnboundedReceiver<HostTask>,
}

impl HostQueue {
    /// Run every task queued so far; returns how many ran
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait for the next task and run it
    ///
    /// Returns `false` once every executor handle is gone and the queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for HostQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostQueue").finish_non_exhaustive()
    }
}

/// The dungeon context the host is currently showing
///
/// Set by the host when its party finder screen opens; cleared together
/// with the lookup cache.
#[derive(Debug, Default)]
pub struct ContextSlot {
    current: RwLock<Option<DungeonContext>>,
}

impl ContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, context: DungeonContext) {
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(context);
        }
    }

    pub fn get(&self) -> Option<DungeonContext> {
        self.current.read().ok().and_then(|guard| *guard)
    }
}

impl ClearListener for ContextSlot {
    fn on_clear(&self) {
        if let Ok(mut guard) = self.current.write() {
            *guard = None;
        }
        debug!("Dungeon context cleared");
    }
}
