use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use signage_domain::{PeriodicScheduler, ScheduleHandle, SchedulerAction, WidgetProfile};
use signage_errors::SignageResult;
use tracing::{debug, info};

use crate::widget::Widget;

/// Interval used when a scheduled kind does not pick its own.
pub const DEFAULT_RUN_INTERVAL: Duration = Duration::from_secs(900);

/// A widget that refreshes itself on a fixed interval while it is playing.
///
/// Kinds implement `scheduler_action` and return their [`SchedulerSlot`]
/// from [`Widget::scheduler`]; the lifecycle then starts, pauses and deletes
/// the periodic task alongside play, pause and stop.
#[async_trait]
pub trait ScheduledWidget: Widget {
    async fn scheduler_action(&self);
}

/// Wraps a weak reference to `widget` into an action the scheduler can own
/// without keeping the widget alive.
pub fn bind_scheduler_action<W: ScheduledWidget>(widget: Weak<W>) -> SchedulerAction {
    Arc::new(move || {
        let widget = widget.clone();
        Box::pin(async move {
            if let Some(widget) = widget.upgrade() {
                widget.scheduler_action().await;
            }
        })
    })
}

/// The periodic task a scheduled widget owns. Holds at most one handle; the
/// task is named after the widget so deleting by name always reaches it.
pub struct SchedulerSlot {
    scheduler: Arc<dyn PeriodicScheduler>,
    name: String,
    run_interval: Duration,
    action: SchedulerAction,
    handle: Mutex<Option<Arc<dyn ScheduleHandle>>>,
}

impl SchedulerSlot {
    pub fn new(
        scheduler: Arc<dyn PeriodicScheduler>,
        profile: &WidgetProfile,
        action: SchedulerAction,
    ) -> Self {
        Self {
            scheduler,
            name: Self::scheduler_name(profile),
            run_interval: DEFAULT_RUN_INTERVAL,
            action,
            handle: Mutex::new(None),
        }
    }

    pub fn with_run_interval(mut self, run_interval: Duration) -> Self {
        self.run_interval = run_interval;
        self
    }

    /// `get_<type>_<id>`, e.g. `get_weather_12`.
    pub fn scheduler_name(profile: &WidgetProfile) -> String {
        format!(
            "get_{}_{}",
            profile.widget_type.as_deref().unwrap_or("widget"),
            profile
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "null".to_string())
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run_interval(&self) -> Duration {
        self.run_interval
    }

    pub fn handle(&self) -> Option<Arc<dyn ScheduleHandle>> {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resume the held task, or create one if none is held.
    pub fn start(&self) -> SignageResult<()> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        match handle.as_ref() {
            Some(existing) => {
                existing.resume();
                debug!("Resumed periodic task {}", self.name);
            }
            None => {
                let created =
                    self.scheduler
                        .create(&self.name, self.run_interval, self.action.clone())?;
                info!(
                    "Created periodic task {} every {}s",
                    self.name,
                    self.run_interval.as_secs()
                );
                *handle = Some(created);
            }
        }
        Ok(())
    }

    pub fn pause(&self) {
        if let Some(handle) = self.handle() {
            handle.pause();
            debug!("Paused periodic task {}", self.name);
        }
    }

    /// Delete the task by name, even when no handle is held, and forget the
    /// handle.
    pub fn stop(&self) {
        self.scheduler.delete(&self.name);
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = None;
        debug!("Deleted periodic task {}", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Lifecycle;
    use crate::widget::WidgetCore;
    use signage_domain::{TimelineSlot, WidgetState};
    use signage_testing_utils::{MockRenderHost, MockScheduler};
    use signage_errors::SignageError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Ticker {
        core: WidgetCore,
        slot: SchedulerSlot,
        host: Arc<MockRenderHost>,
        ticks: AtomicUsize,
        fail_hooks: AtomicBool,
    }

    impl Ticker {
        fn hook_result(&self, hook: &str) -> SignageResult<()> {
            if self.fail_hooks.load(Ordering::SeqCst) {
                return Err(SignageError::render_error(format!("{hook} failed")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Widget for Ticker {
        fn core(&self) -> &WidgetCore {
            &self.core
        }

        fn scheduler(&self) -> Option<&SchedulerSlot> {
            Some(&self.slot)
        }

        async fn on_play(&self, _current: &TimelineSlot) -> SignageResult<()> {
            self.hook_result("play")
        }

        async fn on_stop(&self) -> SignageResult<()> {
            self.hook_result("stop")
        }
    }

    #[async_trait]
    impl ScheduledWidget for Ticker {
        async fn scheduler_action(&self) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ticker(scheduler: Arc<MockScheduler>) -> Arc<Ticker> {
        let mut profile = WidgetProfile::new(1, 1);
        profile.id = Some(12);
        profile.widget_type = Some("ticker".to_string());

        let host = Arc::new(MockRenderHost::new());
        Arc::new_cyclic(|weak: &Weak<Ticker>| Ticker {
            slot: SchedulerSlot::new(scheduler, &profile, bind_scheduler_action(weak.clone())),
            core: WidgetCore::new(profile, host.clone()),
            host,
            ticks: AtomicUsize::new(0),
            fail_hooks: AtomicBool::new(false),
        })
    }

    #[test]
    fn test_scheduler_name() {
        let mut profile = WidgetProfile::new(1, 1);
        profile.id = Some(12);
        profile.widget_type = Some("weather".to_string());
        assert_eq!(SchedulerSlot::scheduler_name(&profile), "get_weather_12");
    }

    #[tokio::test]
    async fn test_play_pause_play_reuses_handle() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();

        widget.play(&slot).await.unwrap();
        assert_eq!(scheduler.create_count("get_ticker_12"), 1);
        assert_eq!(scheduler.interval("get_ticker_12"), Some(DEFAULT_RUN_INTERVAL));
        assert!(widget.slot.handle().is_some());

        widget.pause(&slot).await.unwrap();
        assert!(scheduler.is_paused("get_ticker_12"));
        assert!(widget.slot.handle().is_some());

        widget.play(&slot).await.unwrap();
        assert_eq!(scheduler.create_count("get_ticker_12"), 1);
        assert!(!scheduler.is_paused("get_ticker_12"));
        assert_eq!(widget.core().state(), WidgetState::Playing);
    }

    #[tokio::test]
    async fn test_stop_deletes_task_and_handle() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();

        widget.play(&slot).await.unwrap();
        widget.stop().await.unwrap();
        assert!(widget.slot.handle().is_none());
        assert!(!scheduler.contains("get_ticker_12"));
        assert_eq!(scheduler.delete_count("get_ticker_12"), 1);

        widget.play(&slot).await.unwrap();
        assert_eq!(scheduler.create_count("get_ticker_12"), 2);
    }

    #[tokio::test]
    async fn test_failed_play_hook_leaves_task_paused() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();

        widget.fail_hooks.store(true, Ordering::SeqCst);
        assert!(widget.play(&slot).await.is_err());
        assert_eq!(widget.core().state(), WidgetState::Stopped);
        assert!(scheduler.is_paused("get_ticker_12"));
        assert!(!scheduler.fire("get_ticker_12").await);
        assert_eq!(widget.ticks.load(Ordering::SeqCst), 0);

        widget.fail_hooks.store(false, Ordering::SeqCst);
        widget.play(&slot).await.unwrap();
        assert_eq!(scheduler.create_count("get_ticker_12"), 1);
        assert!(!scheduler.is_paused("get_ticker_12"));
        assert_eq!(widget.core().state(), WidgetState::Playing);
    }

    #[tokio::test]
    async fn test_failed_resume_hook_keeps_task_paused() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();
        widget.play(&slot).await.unwrap();
        widget.pause(&slot).await.unwrap();

        widget.fail_hooks.store(true, Ordering::SeqCst);
        assert!(widget.play(&slot).await.is_err());
        assert_eq!(widget.core().state(), WidgetState::Paused);
        assert!(scheduler.is_paused("get_ticker_12"));
    }

    #[tokio::test]
    async fn test_failed_stop_hook_still_stops() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();
        widget.play(&slot).await.unwrap();

        widget.fail_hooks.store(true, Ordering::SeqCst);
        assert!(widget.stop().await.is_err());
        assert_eq!(widget.core().state(), WidgetState::Stopped);
        assert!(!scheduler.contains("get_ticker_12"));
        assert!(widget.slot.handle().is_none());
        let surface = widget.host.surface("widget_12").unwrap();
        assert_eq!(surface.clear_count(), 1);

        assert!(widget.stop().await.is_err());
        assert_eq!(widget.core().state(), WidgetState::Stopped);
        assert_eq!(surface.clear_count(), 2);
    }

    #[tokio::test]
    async fn test_stop_without_handle_still_deletes_by_name() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        widget.initialize().await.unwrap();

        widget.stop().await.unwrap();
        assert_eq!(scheduler.delete_count("get_ticker_12"), 1);
    }

    #[tokio::test]
    async fn test_bound_action_runs_scheduler_action() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();
        widget.play(&slot).await.unwrap();

        scheduler.fire("get_ticker_12").await;
        scheduler.fire("get_ticker_12").await;
        assert_eq!(widget.ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bound_action_does_not_keep_widget_alive() {
        let scheduler = Arc::new(MockScheduler::new());
        let widget = ticker(scheduler.clone());
        let action = bind_scheduler_action(Arc::downgrade(&widget));
        drop(widget);

        action().await;
    }
}
