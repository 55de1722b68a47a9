use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use signage_errors::SignageResult;

/// Work run on every firing of a periodic task.
pub type SchedulerAction = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A live periodic task. Pausing keeps the task registered so it can be
/// resumed; only [`PeriodicScheduler::delete`] removes it.
pub trait ScheduleHandle: Send + Sync {
    fn name(&self) -> &str;
    fn pause(&self);
    fn resume(&self);
    fn is_paused(&self) -> bool;
}

/// Named, pausable periodic-task facility.
///
/// Names are unique per scheduler. Deleting a name that is not registered
/// is a no-op. Deleting a task prevents future firings but never cancels a
/// firing that is already running.
pub trait PeriodicScheduler: Send + Sync {
    fn create(
        &self,
        name: &str,
        every: Duration,
        action: SchedulerAction,
    ) -> SignageResult<Arc<dyn ScheduleHandle>>;

    fn delete(&self, name: &str);

    fn contains(&self, name: &str) -> bool;
}
