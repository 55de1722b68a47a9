/// Handle the timeline passes to `before_fade_in` so a widget can cut the
/// current loop short.
pub trait TimelineController: Send + Sync {
    fn abort_loop(&self);
}
