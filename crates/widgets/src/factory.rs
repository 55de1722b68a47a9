use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use signage_config::WeatherConfig;
use signage_core::{Lifecycle, Widget};
use signage_domain::{
    CatalogRecord, MessagingClient, PeriodicScheduler, RenderHost, WeatherApi, WidgetProfile,
};
use tracing::{debug, error, info};

use crate::kind::{WidgetKind, GENERAL_TYPE};

/// Collaborators handed to every widget the factory builds.
#[derive(Clone)]
pub struct WidgetServices {
    pub scheduler: Arc<dyn PeriodicScheduler>,
    pub render_host: Arc<dyn RenderHost>,
    pub weather_api: Arc<dyn WeatherApi>,
    pub messaging: Option<Arc<dyn MessagingClient>>,
    pub weather: WeatherConfig,
}

/// Builds widgets from catalog records and starts their initialization.
pub struct WidgetFactory {
    services: WidgetServices,
}

impl WidgetFactory {
    pub fn new(services: WidgetServices) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &WidgetServices {
        &self.services
    }

    /// Build the widget a record describes and spawn its initialization.
    ///
    /// Returns before initialization finishes; the widget reports CREATED
    /// until then. Initialization failures are logged, never returned.
    pub fn create_widget(
        &self,
        record: &CatalogRecord,
        zone_id: i64,
        display_id: i64,
    ) -> Arc<dyn Widget> {
        let type_key = record.widget_type.as_deref().unwrap_or(GENERAL_TYPE);
        let kind = WidgetKind::resolve(type_key);

        let mut profile = kind.default_profile(zone_id, display_id);
        apply_record(&mut profile, record);

        let widget = kind.build(profile, &self.services);
        info!(
            "Created {} widget {} for zone {}",
            kind,
            widget.core().label(),
            zone_id
        );

        spawn_initialize(widget.clone());
        widget
    }

    /// Build one widget per record, keeping catalog order.
    pub fn create_widgets(
        &self,
        records: &[CatalogRecord],
        zone_id: i64,
        display_id: i64,
    ) -> Vec<Arc<dyn Widget>> {
        records
            .iter()
            .map(|record| self.create_widget(record, zone_id, display_id))
            .collect()
    }
}

/// Copy every field the record carries onto the profile; absent fields
/// keep the kind's default.
pub fn apply_record(profile: &mut WidgetProfile, record: &CatalogRecord) {
    if let Some(raw) = record.css_templates.as_deref() {
        match serde_json::from_str::<HashMap<String, Value>>(raw) {
            Ok(templates) => profile.css_templates = templates,
            Err(e) => error!(
                "Failed to decode css_templates for widget {:?}: {}",
                record.id, e
            ),
        }
    }
    if let Some(class) = &record.custom_css_class {
        profile.custom_css_class = Some(class.clone());
    }
    if let Some(desaturation) = record.desaturation {
        profile.desaturation = Some(desaturation);
    }
    if let Some(duration) = record.duration {
        profile.duration = duration;
    }
    if let Some(filler) = record.filler {
        profile.filler = filler;
    }
    if let Some(order) = record.order {
        profile.order = order;
    }
    if let Some(priority) = record.priority {
        profile.priority = priority;
    }
    if let Some(repellent) = record.repellent {
        profile.repellent = repellent;
    }
    if let Some(override_zone) = record.override_zone {
        profile.override_zone = override_zone;
    }
    if let Some(saturation) = record.saturation {
        profile.saturation = Some(saturation);
    }
    if profile.widget_type.is_none() {
        profile.widget_type = record.widget_type.clone();
    }
    if let Some(id) = record.id {
        profile.id = Some(id);
    }
    if let Some(name) = &record.name {
        profile.set_name(name.clone());
    }
    if let Some(minimum_loop_time) = record.minimum_loop_time {
        profile.minimum_loop_time = minimum_loop_time;
    }
    if let Some(config) = &record.config {
        for (property, value) in config {
            profile.add_configuration_metadata(property.clone(), value.clone());
        }
    }
}

fn spawn_initialize(widget: Arc<dyn Widget>) {
    let label = widget.core().label();
    let init = tokio::spawn(async move { widget.initialize().await });

    tokio::spawn(async move {
        match init.await {
            Ok(Ok(())) => debug!("Widget {} ready", label),
            Ok(Err(e)) => error!("Failed to initialize widget {}: {}", label, e),
            Err(e) => error!("Initialization of widget {} panicked: {}", label, e),
        }
    });
}
