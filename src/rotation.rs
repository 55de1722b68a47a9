use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use signage_core::{Lifecycle, Widget};
use signage_domain::{TimelineController, TimelineSlot, WidgetState};
use signage_errors::SignageResult;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Idle wait when no widget had anything to show.
const IDLE_BACKOFF: Duration = Duration::from_secs(5);

/// Abort flag handed to widgets through `before_fade_in`.
#[derive(Debug, Default)]
pub struct LoopControl {
    aborted: AtomicBool,
}

impl LoopControl {
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    fn take_abort(&self) -> bool {
        self.aborted.swap(false, Ordering::SeqCst)
    }
}

impl TimelineController for LoopControl {
    fn abort_loop(&self) {
        info!("Current loop aborted by a widget");
        self.aborted.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Completed { played: usize },
    Aborted { played: usize },
    Idle,
    Shutdown,
}

/// Sequential timeline for one zone: every loop asks each ready widget for
/// a slot within the remaining budget, then plays the slots in order.
pub struct Rotation {
    widgets: Vec<Arc<dyn Widget>>,
    loop_budget: u64,
    control: LoopControl,
}

impl Rotation {
    pub fn new(widgets: Vec<Arc<dyn Widget>>, loop_budget_seconds: u64) -> Self {
        Self {
            widgets,
            loop_budget: loop_budget_seconds,
            control: LoopControl::default(),
        }
    }

    pub fn widgets(&self) -> &[Arc<dyn Widget>] {
        &self.widgets
    }

    pub fn control(&self) -> &LoopControl {
        &self.control
    }

    /// Run loops until shutdown, then stop every initialized widget.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "Starting rotation over {} widgets with a {}s loop",
            self.widgets.len(),
            self.loop_budget
        );

        loop {
            match self.run_loop(&mut shutdown_rx).await {
                LoopOutcome::Shutdown => break,
                LoopOutcome::Idle => {
                    debug!("Nothing to play, waiting {:?}", IDLE_BACKOFF);
                    tokio::select! {
                        _ = tokio::time::sleep(IDLE_BACKOFF) => {}
                        _ = shutdown_rx.recv() => break,
                    }
                }
                LoopOutcome::Completed { played } => debug!("Loop finished after {} slots", played),
                LoopOutcome::Aborted { played } => debug!("Loop aborted after {} slots", played),
            }
        }

        self.stop_all().await;
        info!("Rotation stopped");
    }

    /// Slots for the next loop, in widget order, never exceeding the budget.
    pub async fn plan_loop(&self) -> Vec<(Arc<dyn Widget>, TimelineSlot)> {
        let mut remaining = self.loop_budget;
        let mut playlist = Vec::new();

        for widget in &self.widgets {
            let core = widget.core();
            if !core.is_initialized() || core.is_broken() {
                debug!("Widget {} is not ready, leaving it out", core.label());
                continue;
            }
            if !widget.recheck_for_content().await {
                debug!("Widget {} has no content to play", core.label());
                continue;
            }

            for slot in widget.query_slots(1, remaining) {
                remaining = remaining.saturating_sub(slot.duration);
                playlist.push((widget.clone(), slot));
            }
        }

        playlist
    }

    pub async fn run_loop(&self, shutdown_rx: &mut broadcast::Receiver<()>) -> LoopOutcome {
        let playlist = self.plan_loop().await;
        if playlist.is_empty() {
            return LoopOutcome::Idle;
        }

        let mut played = 0;
        for (index, (widget, slot)) in playlist.iter().enumerate() {
            let previous = index
                .checked_sub(1)
                .and_then(|i| playlist.get(i))
                .map(|(_, slot)| slot);
            let on_deck = playlist.get(index + 1);
            let next = on_deck.map(|(_, slot)| slot);

            if let Err(e) = self.show(widget.as_ref(), slot, previous).await {
                error!("Skipping slot of widget {}: {}", widget.core().label(), e);
                continue;
            }
            played += 1;

            if let Some((next_widget, next_slot)) = on_deck {
                if let Err(e) = next_widget.content_on_deck(next_slot).await {
                    warn!(
                        "Widget {} failed to stage its content: {}",
                        next_widget.core().label(),
                        e
                    );
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(slot.duration)) => {}
                _ = shutdown_rx.recv() => return LoopOutcome::Shutdown,
            }

            if let Err(e) = self.hide(widget.as_ref(), slot, next).await {
                error!("Widget {} failed to leave the screen: {}", widget.core().label(), e);
            }

            if self.control.take_abort() {
                return LoopOutcome::Aborted { played };
            }
        }

        LoopOutcome::Completed { played }
    }

    async fn show(
        &self,
        widget: &dyn Widget,
        slot: &TimelineSlot,
        previous: Option<&TimelineSlot>,
    ) -> SignageResult<()> {
        let state = widget.core().state();
        if state == WidgetState::Stopped {
            widget.get_ready_for_display(slot).await?;
        }

        widget.before_fade_in(slot, previous, &self.control).await?;
        if state != WidgetState::Playing {
            widget.play(slot).await?;
        }
        widget.after_fade_in(slot, previous).await
    }

    async fn hide(
        &self,
        widget: &dyn Widget,
        slot: &TimelineSlot,
        next: Option<&TimelineSlot>,
    ) -> SignageResult<()> {
        let fade = widget.before_fade_out(slot, next).await?;
        if !fade.cancel_fade {
            widget.pause(slot).await?;
        }
        widget.after_fade_out(slot, next).await
    }

    async fn stop_all(&self) {
        for widget in &self.widgets {
            if !widget.core().is_initialized() {
                continue;
            }
            if let Err(e) = widget.stop().await {
                error!("Failed to stop widget {}: {}", widget.core().label(), e);
            }
        }
    }
}
