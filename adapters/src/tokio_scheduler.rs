use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::AbortHandle;
use tracing::debug;

use application::ports::out_::{ScheduledTask, TimeoutScheduler};
use domain::UserId;

type PendingTasks = DashMap<UserId, (u64, AbortHandle)>;

/// Runs each deferred task on its own tokio task after a sleep. Scheduling
/// the same key again aborts the earlier task.
pub struct TokioTimeoutScheduler {
    pending: Arc<PendingTasks>,
    generation: AtomicU64,
}

impl TokioTimeoutScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of tasks still waiting to fire.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for TokioTimeoutScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeoutScheduler for TokioTimeoutScheduler {
    fn schedule(
        &self,
        key: UserId,
        delay: Duration,
        task: ScheduledTask,
    ) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let owner = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A replacement may already sit under this key.
            pending.remove_if(&owner, |_, (current, _)| *current == generation);
            task.await;
        });

        if let Some((_, previous)) = self.pending.insert(key.clone(), (generation, handle.abort_handle())) {
            previous.abort();
        }
        debug!(user_id = %key, delay_ms = delay.as_millis() as u64, "Timeout armed");
    }

    fn cancel(
        &self,
        key: &UserId,
    ) {
        if let Some((_, (_, handle))) = self.pending.remove(key) {
            handle.abort();
            debug!(user_id = %key, "Timeout cancelled");
        }
    }
}
