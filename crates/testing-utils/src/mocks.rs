//! In-memory implementations of the widget ports.
//!
//! Every mock records what it was asked to do so tests can assert on it
//! without a real timer, renderer or network.

use async_trait::async_trait;
use signage_domain::{
    Layout, MessagingClient, PeriodicScheduler, RenderContext, RenderHost, RenderSurface,
    ScheduleHandle, SchedulerAction, SurfaceSpec, WeatherApi, WeatherResponse, WeatherUpdate,
};
use signage_errors::{SignageError, SignageResult};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// Handle returned by [`MockScheduler`].
#[derive(Debug)]
pub struct MockScheduleHandle {
    name: String,
    paused: AtomicBool,
}

impl ScheduleHandle for MockScheduleHandle {
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

struct MockTask {
    handle: Arc<MockScheduleHandle>,
    every: Duration,
    action: SchedulerAction,
}

/// Scheduler that never fires on its own; tests drive firings with
/// [`MockScheduler::fire`].
#[derive(Clone, Default)]
pub struct MockScheduler {
    tasks: Arc<Mutex<HashMap<String, MockTask>>>,
    creates: Arc<Mutex<HashMap<String, usize>>>,
    deletes: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_count(&self, name: &str) -> usize {
        self.creates.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn delete_count(&self, name: &str) -> usize {
        self.deletes.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn is_paused(&self, name: &str) -> bool {
        self.tasks
            .lock()
            .unwrap()
            .get(name)
            .map(|task| task.handle.is_paused())
            .unwrap_or(false)
    }

    pub fn interval(&self, name: &str) -> Option<Duration> {
        self.tasks.lock().unwrap().get(name).map(|task| task.every)
    }

    pub fn task_names(&self) -> Vec<String> {
        self.tasks.lock().unwrap().keys().cloned().collect()
    }

    /// Run one firing of `name` to completion. Paused or unknown tasks do
    /// not fire; returns whether the action ran.
    pub async fn fire(&self, name: &str) -> bool {
        let action = {
            let tasks = self.tasks.lock().unwrap();
            match tasks.get(name) {
                Some(task) if !task.handle.is_paused() => task.action.clone(),
                _ => return false,
            }
        };
        action().await;
        true
    }
}

impl PeriodicScheduler for MockScheduler {
    fn create(
        &self,
        name: &str,
        every: Duration,
        action: SchedulerAction,
    ) -> SignageResult<Arc<dyn ScheduleHandle>> {
        let handle = Arc::new(MockScheduleHandle {
            name: name.to_string(),
            paused: AtomicBool::new(false),
        });
        self.tasks.lock().unwrap().insert(
            name.to_string(),
            MockTask {
                handle: handle.clone(),
                every,
                action,
            },
        );
        *self
            .creates
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
        Ok(handle)
    }

    fn delete(&self, name: &str) {
        self.tasks.lock().unwrap().remove(name);
        *self
            .deletes
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
    }

    fn contains(&self, name: &str) -> bool {
        self.tasks.lock().unwrap().contains_key(name)
    }
}

/// Surface that records render contexts and clears.
#[derive(Debug)]
pub struct MockSurface {
    spec: SurfaceSpec,
    layout: Layout,
    renders: Mutex<Vec<RenderContext>>,
    clears: AtomicUsize,
    fail_render: AtomicBool,
}

impl MockSurface {
    pub fn new(spec: SurfaceSpec, layout: Layout) -> Self {
        Self {
            spec,
            layout,
            renders: Mutex::new(Vec::new()),
            clears: AtomicUsize::new(0),
            fail_render: AtomicBool::new(false),
        }
    }

    pub fn spec(&self) -> &SurfaceSpec {
        &self.spec
    }

    pub fn renders(&self) -> Vec<RenderContext> {
        self.renders.lock().unwrap().clone()
    }

    pub fn last_render(&self) -> Option<RenderContext> {
        self.renders.lock().unwrap().last().cloned()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn set_fail_render(&self, fail: bool) {
        self.fail_render.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RenderSurface for MockSurface {
    fn element_id(&self) -> &str {
        &self.spec.element_id
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    async fn render(&self, context: RenderContext) -> SignageResult<()> {
        if self.fail_render.load(Ordering::SeqCst) {
            return Err(SignageError::render_error("mock render failure"));
        }
        self.renders.lock().unwrap().push(context);
        Ok(())
    }

    async fn clear(&self) -> SignageResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Render host handing out [`MockSurface`]s keyed by element id.
#[derive(Debug, Default)]
pub struct MockRenderHost {
    layout: Layout,
    surfaces: Mutex<HashMap<String, Arc<MockSurface>>>,
    specs: Mutex<Vec<SurfaceSpec>>,
    fail_next_acquire: AtomicBool,
}

impl MockRenderHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn fail_next_acquire(&self) {
        self.fail_next_acquire.store(true, Ordering::SeqCst);
    }

    pub fn acquired_specs(&self) -> Vec<SurfaceSpec> {
        self.specs.lock().unwrap().clone()
    }

    pub fn surface(&self, element_id: &str) -> Option<Arc<MockSurface>> {
        self.surfaces.lock().unwrap().get(element_id).cloned()
    }
}

#[async_trait]
impl RenderHost for MockRenderHost {
    async fn acquire_surface(&self, spec: SurfaceSpec) -> SignageResult<Arc<dyn RenderSurface>> {
        if self.fail_next_acquire.swap(false, Ordering::SeqCst) {
            return Err(SignageError::render_error("mock surface unavailable"));
        }
        let surface = Arc::new(MockSurface::new(spec.clone(), self.layout));
        self.surfaces
            .lock()
            .unwrap()
            .insert(spec.element_id.clone(), surface.clone());
        self.specs.lock().unwrap().push(spec);
        Ok(surface)
    }
}

/// Weather API answering from a queue of canned outcomes, falling back to a
/// default response once the queue is empty.
#[derive(Debug, Default)]
pub struct MockWeatherApi {
    queued: Mutex<VecDeque<Result<WeatherResponse, String>>>,
    fallback: Mutex<Option<WeatherResponse>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockWeatherApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(response: WeatherResponse) -> Self {
        let api = Self::new();
        api.set_fallback(response);
        api
    }

    pub fn set_fallback(&self, response: WeatherResponse) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    pub fn push_response(&self, response: WeatherResponse) {
        self.queued.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_failure(&self, message: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherApi for MockWeatherApi {
    async fn get_weather(&self, location: &str, units: &str) -> SignageResult<WeatherResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((location.to_string(), units.to_string()));

        let queued = self.queued.lock().unwrap().pop_front();
        match queued {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(SignageError::fetch_error(message)),
            None => self
                .fallback
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| SignageError::fetch_error("no weather response configured")),
        }
    }
}

/// Push channel backed by a broadcast sender the test publishes on.
#[derive(Debug)]
pub struct MockMessagingClient {
    sender: broadcast::Sender<WeatherUpdate>,
    subscriptions: Mutex<Vec<String>>,
    fail_subscribe: AtomicBool,
}

impl MockMessagingClient {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            sender,
            subscriptions: Mutex::new(Vec::new()),
            fail_subscribe: AtomicBool::new(false),
        }
    }

    /// Publish an update; returns how many listeners received it.
    pub fn push_update(&self, location: &str) -> usize {
        self.sender
            .send(WeatherUpdate {
                location: location.to_string(),
            })
            .unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockMessagingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingClient for MockMessagingClient {
    fn weather_updates(&self) -> broadcast::Receiver<WeatherUpdate> {
        self.sender.subscribe()
    }

    async fn subscribe_to_weather(&self, location: &str) -> SignageResult<()> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(SignageError::Subscription(format!(
                "mock subscription to {location} refused"
            )));
        }
        self.subscriptions.lock().unwrap().push(location.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scheduler_skips_paused_tasks() {
        let scheduler = MockScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let action: SchedulerAction = Arc::new(move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });

        let handle = scheduler
            .create("get_test_1", Duration::from_secs(5), action)
            .unwrap();
        assert!(scheduler.fire("get_test_1").await);
        handle.pause();
        assert!(!scheduler.fire("get_test_1").await);
        handle.resume();
        assert!(scheduler.fire("get_test_1").await);
        scheduler.delete("get_test_1");
        assert!(!scheduler.fire("get_test_1").await);

        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.create_count("get_test_1"), 1);
        assert_eq!(scheduler.delete_count("get_test_1"), 1);
    }

    #[tokio::test]
    async fn test_mock_weather_api_queue_then_fallback() {
        let api = MockWeatherApi::new();
        api.push_failure("boom");
        api.set_fallback(WeatherResponse::default());

        assert!(api.get_weather("10001", "c").await.is_err());
        assert!(api.get_weather("10001", "c").await.is_ok());
        assert_eq!(api.call_count(), 2);
        assert_eq!(api.calls()[0], ("10001".to_string(), "c".to_string()));
    }
}
