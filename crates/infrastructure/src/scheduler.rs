use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use signage_domain::{PeriodicScheduler, ScheduleHandle, SchedulerAction};
use signage_errors::{SignageError, SignageResult};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct TokioScheduleHandle {
    name: String,
    paused: AtomicBool,
}

impl ScheduleHandle for TokioScheduleHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

struct ScheduledTask {
    shutdown_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Periodic tasks on the tokio timer.
///
/// The first firing happens one interval after creation. Every firing runs
/// as its own task, so deleting a schedule stops future firings without
/// cancelling one that is already running.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    tasks: Arc<Mutex<HashMap<String, ScheduledTask>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock_tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete every registered task.
    pub fn shutdown(&self) {
        let tasks: Vec<(String, ScheduledTask)> = self.lock_tasks().drain().collect();
        for (name, task) in tasks {
            Self::stop_task(&name, task);
        }
        info!("Periodic scheduler shut down");
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, HashMap<String, ScheduledTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_task(name: &str, task: ScheduledTask) {
        if task.shutdown_tx.send(()).is_err() {
            task.join.abort();
        }
        debug!("Stopped periodic task {}", name);
    }
}

impl PeriodicScheduler for TokioScheduler {
    fn create(
        &self,
        name: &str,
        every: Duration,
        action: SchedulerAction,
    ) -> SignageResult<Arc<dyn ScheduleHandle>> {
        if every.is_zero() {
            return Err(SignageError::scheduler_error(format!(
                "periodic task {name} needs a non-zero interval"
            )));
        }

        let handle = Arc::new(TokioScheduleHandle {
            name: name.to_string(),
            paused: AtomicBool::new(false),
        });
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_handle = handle.clone();
        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if task_handle.is_paused() {
                            debug!("Skipping paused periodic task {}", task_handle.name());
                            continue;
                        }
                        debug!("Firing periodic task {}", task_handle.name());
                        tokio::spawn(action());
                    }
                    _ = &mut shutdown_rx => {
                        break;
                    }
                }
            }
        });

        let replaced = self.lock_tasks().insert(
            name.to_string(),
            ScheduledTask { shutdown_tx, join },
        );
        if let Some(previous) = replaced {
            warn!("Periodic task {} already existed; replacing it", name);
            Self::stop_task(name, previous);
        }

        info!("Scheduled periodic task {} every {:?}", name, every);
        Ok(handle)
    }

    fn delete(&self, name: &str) {
        let removed = self.lock_tasks().remove(name);
        match removed {
            Some(task) => Self::stop_task(name, task),
            None => debug!("No periodic task named {} to delete", name),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.lock_tasks().contains_key(name)
    }
}
