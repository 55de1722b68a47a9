use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use signage_domain::{
    FadeOut, Layout, RenderContext, RenderHost, RenderSurface, TimelineController, TimelineSlot,
    WidgetProfile, WidgetState,
};
use signage_errors::{SignageError, SignageResult};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::scheduled::SchedulerSlot;
use crate::surface::surface_spec;

#[derive(Debug)]
struct RuntimeState {
    state: WidgetState,
    has_content_to_play: bool,
    broken: bool,
    timeline_slots: Vec<TimelineSlot>,
}

/// State shared by every widget kind: the immutable profile plus the runtime
/// flags the lifecycle and the kind's hooks update.
///
/// Locks are never held across an await point. Lifecycle transitions are
/// serialized by a separate async guard, see [`WidgetCore::begin_transition`].
pub struct WidgetCore {
    profile: WidgetProfile,
    render_host: Arc<dyn RenderHost>,
    runtime: RwLock<RuntimeState>,
    surface: RwLock<Option<Arc<dyn RenderSurface>>>,
    transition: Mutex<()>,
}

impl WidgetCore {
    pub fn new(profile: WidgetProfile, render_host: Arc<dyn RenderHost>) -> Self {
        Self {
            profile,
            render_host,
            runtime: RwLock::new(RuntimeState {
                state: WidgetState::Created,
                has_content_to_play: true,
                broken: false,
                timeline_slots: Vec::new(),
            }),
            surface: RwLock::new(None),
            transition: Mutex::new(()),
        }
    }

    pub fn profile(&self) -> &WidgetProfile {
        &self.profile
    }

    pub fn id(&self) -> Option<i64> {
        self.profile.id
    }

    pub fn label(&self) -> String {
        self.profile.label()
    }

    pub fn state(&self) -> WidgetState {
        self.read_runtime(|runtime| runtime.state)
    }

    pub fn is_initialized(&self) -> bool {
        self.state().is_initialized()
    }

    /// True whenever the widget is not actively playing.
    pub fn is_paused(&self) -> bool {
        self.state() != WidgetState::Playing
    }

    pub fn has_content_to_play(&self) -> bool {
        self.read_runtime(|runtime| runtime.has_content_to_play)
    }

    pub fn set_has_content_to_play(&self, has_content: bool) {
        self.write_runtime(|runtime| runtime.has_content_to_play = has_content);
    }

    /// A broken widget is skipped by the driver. Nothing in the lifecycle
    /// sets this; widget kinds decide when their data is unusable.
    pub fn is_broken(&self) -> bool {
        self.read_runtime(|runtime| runtime.broken)
    }

    pub fn mark_broken(&self, broken: bool) {
        self.write_runtime(|runtime| runtime.broken = broken);
    }

    /// Slots produced by the last [`WidgetCore::query_content`] call.
    pub fn timeline_slots(&self) -> Vec<TimelineSlot> {
        self.read_runtime(|runtime| runtime.timeline_slots.clone())
    }

    pub fn surface(&self) -> Option<Arc<dyn RenderSurface>> {
        self.surface
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Orientation of the owned surface, landscape until one is acquired.
    pub fn layout(&self) -> Layout {
        self.surface()
            .map(|surface| surface.layout())
            .unwrap_or_default()
    }

    /// Draw into the owned surface.
    pub async fn render(&self, template: &str, data: Value) -> SignageResult<()> {
        let surface = self.surface().ok_or_else(|| {
            SignageError::render_error(format!("widget {} has no surface", self.label()))
        })?;
        let context = RenderContext {
            widget_id: self.id(),
            template: template.to_string(),
            data,
            layout: surface.layout(),
        };
        surface.render(context).await
    }

    pub fn generate_slot(
        &self,
        duration: u64,
        params: Option<Map<String, Value>>,
        group_id: Option<&str>,
    ) -> TimelineSlot {
        TimelineSlot {
            widget: self.profile.widget_ref(),
            duration,
            params,
            group_identifier: group_id.map(|group| self.profile.group_identifier(group)),
        }
    }

    /// Replace the cached timeline slots with a single default-duration slot
    /// and return them.
    pub fn query_content(&self) -> Vec<TimelineSlot> {
        let slots = vec![self.generate_slot(self.profile.duration, None, None)];
        self.write_runtime(|runtime| runtime.timeline_slots = slots.clone());
        slots
    }

    /// Allocate up to `num_slots` default-duration slots while the remaining
    /// budget still covers a whole slot.
    pub fn query_slots(&self, num_slots: usize, max_duration: u64) -> Vec<TimelineSlot> {
        let duration = self.profile.duration;
        let mut remaining = max_duration;
        let mut slots = Vec::new();

        for _ in 0..num_slots {
            if duration > remaining {
                break;
            }
            slots.push(self.generate_slot(duration, None, None));
            remaining -= duration;
        }

        slots
    }

    pub(crate) fn set_state(&self, state: WidgetState) {
        let previous = self.write_runtime(|runtime| std::mem::replace(&mut runtime.state, state));
        debug!("Widget {} moved from {} to {}", self.label(), previous, state);
    }

    /// Claim the right to run a lifecycle transition. A second transition
    /// attempted while one is in flight is rejected rather than queued.
    pub(crate) fn begin_transition(&self, operation: &str) -> SignageResult<MutexGuard<'_, ()>> {
        self.transition.try_lock().map_err(|_| {
            warn!(
                "Rejected {} on widget {}: another transition is running",
                operation,
                self.label()
            );
            SignageError::transition_in_progress(self.label())
        })
    }

    pub(crate) async fn attach_surface(&self) -> SignageResult<()> {
        let surface = self
            .render_host
            .acquire_surface(surface_spec(&self.profile))
            .await?;
        *self.surface.write().unwrap_or_else(PoisonError::into_inner) = Some(surface);
        Ok(())
    }

    pub(crate) async fn clear_surface(&self) {
        if let Some(surface) = self.surface() {
            if let Err(e) = surface.clear().await {
                warn!("Failed to clear surface of widget {}: {}", self.label(), e);
            }
        }
    }

    fn read_runtime<T>(&self, f: impl FnOnce(&RuntimeState) -> T) -> T {
        let runtime = self.runtime.read().unwrap_or_else(PoisonError::into_inner);
        f(&*runtime)
    }

    fn write_runtime<T>(&self, f: impl FnOnce(&mut RuntimeState) -> T) -> T {
        let mut runtime = self.runtime.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *runtime)
    }
}

/// Behaviour a widget kind contributes to the shared lifecycle.
///
/// Every hook has a default, so a kind overrides only what it needs. The
/// lifecycle operations themselves live on [`crate::Lifecycle`], which is
/// implemented for every `Widget` and cannot be overridden.
#[async_trait]
pub trait Widget: Send + Sync + 'static {
    fn core(&self) -> &WidgetCore;

    /// Periodic refresh attached to this widget, if it has one.
    fn scheduler(&self) -> Option<&SchedulerSlot> {
        None
    }

    /// Runs once, before the surface is acquired.
    async fn on_initialize(&self) -> SignageResult<()> {
        Ok(())
    }

    async fn prepare_for_display(&self, _current: &TimelineSlot) -> SignageResult<()> {
        Ok(())
    }

    async fn on_play(&self, _current: &TimelineSlot) -> SignageResult<()> {
        Ok(())
    }

    async fn do_pause(&self, _current: &TimelineSlot) -> SignageResult<()> {
        Ok(())
    }

    async fn on_stop(&self) -> SignageResult<()> {
        Ok(())
    }

    async fn before_fade_in(
        &self,
        _current: &TimelineSlot,
        _previous: Option<&TimelineSlot>,
        _timeline: &dyn TimelineController,
    ) -> SignageResult<()> {
        Ok(())
    }

    async fn after_fade_in(
        &self,
        _current: &TimelineSlot,
        _previous: Option<&TimelineSlot>,
    ) -> SignageResult<()> {
        Ok(())
    }

    /// Skip the fade when the next slot belongs to this same widget.
    async fn before_fade_out(
        &self,
        current: &TimelineSlot,
        next: Option<&TimelineSlot>,
    ) -> SignageResult<FadeOut> {
        Ok(FadeOut {
            cancel_fade: next.is_some_and(|next| next.belongs_to_same_widget(current)),
        })
    }

    async fn after_fade_out(
        &self,
        _current: &TimelineSlot,
        _next: Option<&TimelineSlot>,
    ) -> SignageResult<()> {
        Ok(())
    }

    async fn content_on_deck(&self, _next: &TimelineSlot) -> SignageResult<()> {
        Ok(())
    }

    fn clear_cache(&self) {}

    async fn recheck_for_content(&self) -> bool {
        self.core().has_content_to_play()
    }

    fn query_content(&self) -> Vec<TimelineSlot> {
        self.core().query_content()
    }

    fn query_slots(&self, num_slots: usize, max_duration: u64) -> Vec<TimelineSlot> {
        self.core().query_slots(num_slots, max_duration)
    }

    fn generate_slot(
        &self,
        duration: u64,
        params: Option<Map<String, Value>>,
        group_id: Option<&str>,
    ) -> TimelineSlot {
        self.core().generate_slot(duration, params, group_id)
    }
}
