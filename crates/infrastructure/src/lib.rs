//! Reference adapters for the widget runtime's collaborator ports.

pub mod messaging;
pub mod render;
pub mod scheduler;
pub mod weather_api;

pub use messaging::BroadcastMessagingClient;
pub use render::{TracingRenderHost, TracingSurface};
pub use scheduler::{TokioScheduleHandle, TokioScheduler};
pub use weather_api::HttpWeatherApi;
