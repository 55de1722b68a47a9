pub mod lifecycle;
pub mod scheduled;
pub mod surface;
pub mod widget;

pub use lifecycle::Lifecycle;
pub use scheduled::{bind_scheduler_action, ScheduledWidget, SchedulerSlot, DEFAULT_RUN_INTERVAL};
pub use surface::{surface_spec, value_not_empty};
pub use widget::{Widget, WidgetCore};

pub use signage_errors::{SignageError, SignageResult};
