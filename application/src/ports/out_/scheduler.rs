use std::time::Duration;

use futures::future::BoxFuture;

use domain::UserId;

pub type ScheduledTask = BoxFuture<'static, ()>;

/// Deferred one-shot actions keyed by user. At most one task per key is
/// pending; scheduling again replaces the earlier task.
pub trait TimeoutScheduler: Send + Sync {
    fn schedule(
        &self,
        key: UserId,
        delay: Duration,
        task: ScheduledTask,
    );

    /// Drops the pending task for `key`, if any.
    fn cancel(
        &self,
        key: &UserId,
    );
}
