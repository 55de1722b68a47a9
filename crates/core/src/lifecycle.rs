use async_trait::async_trait;
use signage_domain::{TimelineSlot, WidgetState};
use signage_errors::{SignageError, SignageResult};
use tracing::{debug, info};

use crate::widget::Widget;

/// The lifecycle state machine shared by every widget:
///
/// ```text
/// CREATED --initialize--> STOPPED --play--> PLAYING --pause--> PAUSED
///                            ^                 ^                  |
///                            |                 +------play--------+
///                            +--------------stop (any initialized state)
/// ```
///
/// Implemented once for every [`Widget`]; kinds customise behaviour through
/// the hooks instead. Only one transition runs at a time per widget, a
/// concurrent call fails with [`SignageError::TransitionInProgress`].
#[async_trait]
pub trait Lifecycle {
    /// Run the kind's initialization hook, acquire a render surface and
    /// move to STOPPED. Valid only once, from CREATED.
    async fn initialize(&self) -> SignageResult<()>;

    /// Let the kind refresh its data ahead of display. Valid from STOPPED.
    async fn get_ready_for_display(&self, current: &TimelineSlot) -> SignageResult<()>;

    /// Start or resume presentation, bringing the periodic refresh along.
    async fn play(&self, current: &TimelineSlot) -> SignageResult<()>;

    /// Suspend presentation. Does nothing unless the widget is PLAYING.
    async fn pause(&self, current: &TimelineSlot) -> SignageResult<()>;

    /// Tear down presentation and the periodic refresh, keeping the
    /// widget reusable. Idempotent for initialized widgets.
    async fn stop(&self) -> SignageResult<()>;
}

#[async_trait]
impl<W: Widget + ?Sized> Lifecycle for W {
    async fn initialize(&self) -> SignageResult<()> {
        let core = self.core();
        let _guard = core.begin_transition("initialize")?;

        let state = core.state();
        if state != WidgetState::Created {
            return Err(SignageError::invalid_transition(
                core.label(),
                state.as_str(),
                "initialize",
            ));
        }

        self.on_initialize().await?;
        core.attach_surface().await?;
        core.set_state(WidgetState::Stopped);

        info!("Widget {} initialized", core.label());
        Ok(())
    }

    async fn get_ready_for_display(&self, current: &TimelineSlot) -> SignageResult<()> {
        let core = self.core();
        let _guard = core.begin_transition("get ready for display")?;

        let state = core.state();
        if state != WidgetState::Stopped {
            return Err(SignageError::invalid_transition(
                core.label(),
                state.as_str(),
                "get ready for display",
            ));
        }

        self.prepare_for_display(current).await
    }

    async fn play(&self, current: &TimelineSlot) -> SignageResult<()> {
        let core = self.core();
        let _guard = core.begin_transition("play")?;

        let state = core.state();
        if !state.can_play() {
            return Err(SignageError::invalid_transition(
                core.label(),
                state.as_str(),
                "play",
            ));
        }

        if let Some(scheduler) = self.scheduler() {
            scheduler.start()?;
        }
        if let Err(e) = self.on_play(current).await {
            if let Some(scheduler) = self.scheduler() {
                scheduler.pause();
            }
            return Err(e);
        }
        core.set_state(WidgetState::Playing);
        Ok(())
    }

    async fn pause(&self, current: &TimelineSlot) -> SignageResult<()> {
        let core = self.core();
        let _guard = core.begin_transition("pause")?;

        if core.state() != WidgetState::Playing {
            debug!("Ignoring pause of widget {}: not playing", core.label());
            return Ok(());
        }

        if let Some(scheduler) = self.scheduler() {
            scheduler.pause();
        }
        core.set_state(WidgetState::Paused);
        self.do_pause(current).await
    }

    async fn stop(&self) -> SignageResult<()> {
        let core = self.core();
        let _guard = core.begin_transition("stop")?;

        let state = core.state();
        if state == WidgetState::Created {
            return Err(SignageError::invalid_transition(
                core.label(),
                state.as_str(),
                "stop",
            ));
        }

        if let Some(scheduler) = self.scheduler() {
            scheduler.stop();
        }
        let hook = self.on_stop().await;
        core.clear_surface().await;
        core.set_state(WidgetState::Stopped);
        hook
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetCore;
    use signage_domain::WidgetProfile;
    use signage_testing_utils::MockRenderHost;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Probe {
        core: WidgetCore,
        initialized: AtomicUsize,
        paused: AtomicUsize,
        stopped: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Widget for Probe {
        fn core(&self) -> &WidgetCore {
            &self.core
        }

        async fn on_initialize(&self) -> SignageResult<()> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.initialized.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn do_pause(&self, _current: &TimelineSlot) -> SignageResult<()> {
            self.paused.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_stop(&self) -> SignageResult<()> {
            self.stopped.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn probe(host: Arc<MockRenderHost>, gate: Option<Arc<Notify>>) -> Probe {
        let mut profile = WidgetProfile::new(1, 1);
        profile.id = Some(3);
        profile.widget_type = Some("probe".to_string());
        Probe {
            core: WidgetCore::new(profile, host),
            initialized: AtomicUsize::new(0),
            paused: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
            gate,
        }
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let host = Arc::new(MockRenderHost::new());
        let widget = probe(host.clone(), None);
        let slot = widget.generate_slot(10, None, None);

        widget.initialize().await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Stopped);
        assert_eq!(widget.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(host.acquired_specs().len(), 1);
        assert!(widget.core().surface().is_some());

        widget.get_ready_for_display(&slot).await.unwrap();
        widget.play(&slot).await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Playing);

        widget.pause(&slot).await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Paused);
        assert!(widget.core().is_paused());
        assert_eq!(widget.paused.load(Ordering::SeqCst), 1);

        widget.play(&slot).await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Playing);

        widget.stop().await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Stopped);
        assert_eq!(widget.stopped.load(Ordering::SeqCst), 1);
        assert_eq!(host.surface("widget_3").unwrap().clear_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_rejected() {
        let widget = probe(Arc::new(MockRenderHost::new()), None);
        widget.initialize().await.unwrap();

        let err = widget.initialize().await.unwrap_err();
        assert!(matches!(err, SignageError::InvalidTransition { .. }));
        assert_eq!(widget.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(widget.core().state(), WidgetState::Stopped);
    }

    #[tokio::test]
    async fn test_play_before_initialize_is_rejected() {
        let widget = probe(Arc::new(MockRenderHost::new()), None);
        let slot = widget.generate_slot(10, None, None);

        let err = widget.play(&slot).await.unwrap_err();
        assert!(err.is_lifecycle_violation());
        assert_eq!(widget.core().state(), WidgetState::Created);
    }

    #[tokio::test]
    async fn test_play_while_playing_is_rejected() {
        let widget = probe(Arc::new(MockRenderHost::new()), None);
        let slot = widget.generate_slot(10, None, None);
        widget.initialize().await.unwrap();
        widget.play(&slot).await.unwrap();

        let err = widget.play(&slot).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "widget probe:3 cannot play while PLAYING"
        );
        assert_eq!(widget.core().state(), WidgetState::Playing);
    }

    #[tokio::test]
    async fn test_get_ready_requires_stopped() {
        let widget = probe(Arc::new(MockRenderHost::new()), None);
        let slot = widget.generate_slot(10, None, None);

        assert!(widget.get_ready_for_display(&slot).await.is_err());
        widget.initialize().await.unwrap();
        widget.play(&slot).await.unwrap();
        assert!(widget.get_ready_for_display(&slot).await.is_err());
    }

    #[tokio::test]
    async fn test_pause_outside_playing_is_noop() {
        let widget = probe(Arc::new(MockRenderHost::new()), None);
        let slot = widget.generate_slot(10, None, None);

        widget.pause(&slot).await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Created);

        widget.initialize().await.unwrap();
        widget.pause(&slot).await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Stopped);

        widget.play(&slot).await.unwrap();
        widget.pause(&slot).await.unwrap();
        widget.pause(&slot).await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Paused);
        assert_eq!(widget.paused.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let host = Arc::new(MockRenderHost::new());
        let widget = probe(host.clone(), None);
        widget.initialize().await.unwrap();

        widget.stop().await.unwrap();
        widget.stop().await.unwrap();
        assert_eq!(widget.core().state(), WidgetState::Stopped);
        assert_eq!(widget.stopped.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stop_before_initialize_is_rejected() {
        let widget = probe(Arc::new(MockRenderHost::new()), None);
        assert!(widget.stop().await.is_err());
        assert_eq!(widget.stopped.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_transition_is_rejected() {
        let gate = Arc::new(Notify::new());
        let widget = Arc::new(probe(
            Arc::new(MockRenderHost::new()),
            Some(gate.clone()),
        ));

        let first = {
            let widget = widget.clone();
            tokio::spawn(async move { widget.initialize().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = widget.initialize().await.unwrap_err();
        assert!(matches!(err, SignageError::TransitionInProgress { .. }));

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(widget.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(widget.core().state(), WidgetState::Stopped);
    }

    #[tokio::test]
    async fn test_failed_surface_keeps_created() {
        let host = Arc::new(MockRenderHost::new());
        host.fail_next_acquire();
        let widget = probe(host, None);

        assert!(widget.initialize().await.is_err());
        assert_eq!(widget.core().state(), WidgetState::Created);
    }
}
