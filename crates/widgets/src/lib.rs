//! Concrete widget kinds and the factory that builds them from catalog
//! records.

pub mod factory;
pub mod generic;
pub mod kind;
pub mod weather;

pub use factory::{WidgetFactory, WidgetServices};
pub use generic::GenericWidget;
pub use kind::WidgetKind;
pub use weather::{TemperatureScale, WeatherReport, WeatherWidget};
