pub mod app_config;
pub mod display;
pub mod logging;
pub mod widgets;

pub use app_config::*;
pub use display::*;
pub use logging::*;
pub use widgets::*;
