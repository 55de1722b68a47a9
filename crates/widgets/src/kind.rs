use std::fmt;
use std::sync::Arc;

use signage_core::Widget;
use signage_domain::WidgetProfile;
use tracing::warn;

use crate::factory::WidgetServices;
use crate::generic::GenericWidget;
use crate::weather::{WeatherWidget, WEATHER_TYPE};

/// Type key used when a catalog record carries no type.
pub const GENERAL_TYPE: &str = "general";

/// Widget kinds this runtime knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Weather,
    Generic,
}

impl WidgetKind {
    /// Map a catalog type key to a kind. Unknown keys fall back to
    /// [`WidgetKind::Generic`] with a warning.
    pub fn resolve(type_key: &str) -> Self {
        match type_key {
            WEATHER_TYPE => WidgetKind::Weather,
            GENERAL_TYPE => WidgetKind::Generic,
            other => {
                warn!(
                    "Unknown widget type '{}', falling back to a generic widget",
                    other
                );
                WidgetKind::Generic
            }
        }
    }

    pub fn type_key(&self) -> &'static str {
        match self {
            WidgetKind::Weather => WEATHER_TYPE,
            WidgetKind::Generic => GENERAL_TYPE,
        }
    }

    pub fn default_profile(&self, zone_id: i64, display_id: i64) -> WidgetProfile {
        match self {
            WidgetKind::Weather => WeatherWidget::default_profile(zone_id, display_id),
            WidgetKind::Generic => WidgetProfile::new(zone_id, display_id),
        }
    }

    pub fn build(&self, profile: WidgetProfile, services: &WidgetServices) -> Arc<dyn Widget> {
        match self {
            WidgetKind::Weather => WeatherWidget::new(
                profile,
                services.render_host.clone(),
                services.scheduler.clone(),
                services.weather_api.clone(),
                services.messaging.clone(),
                services.weather.clone(),
            ),
            WidgetKind::Generic => GenericWidget::new(profile, services.render_host.clone()),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_key())
    }
}
