use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use signage_config::AppConfig;
use signage_domain::{CatalogRecord, Layout};
use signage_infrastructure::{
    BroadcastMessagingClient, HttpWeatherApi, TokioScheduler, TracingRenderHost,
};
use signage_widgets::{WidgetFactory, WidgetServices};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::rotation::Rotation;

/// Wires the infrastructure adapters into a factory and runs the zone.
pub struct Application {
    config: AppConfig,
    factory: WidgetFactory,
    scheduler: TokioScheduler,
    messaging: Arc<BroadcastMessagingClient>,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self> {
        info!(
            "Initializing signage runtime for zone {} on display {}",
            config.display.zone_id, config.display.display_id
        );

        let scheduler = TokioScheduler::new();
        let messaging = Arc::new(BroadcastMessagingClient::new());
        let weather_api =
            HttpWeatherApi::from_config(&config.weather).context("failed to create weather API client")?;

        let factory = WidgetFactory::new(WidgetServices {
            scheduler: Arc::new(scheduler.clone()),
            render_host: Arc::new(TracingRenderHost::new(Layout::Landscape)),
            weather_api: Arc::new(weather_api),
            messaging: Some(messaging.clone()),
            weather: config.weather.clone(),
        });

        Ok(Self {
            config,
            factory,
            scheduler,
            messaging,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn messaging(&self) -> &Arc<BroadcastMessagingClient> {
        &self.messaging
    }

    /// Build the zone's widgets from the catalog file and rotate them until
    /// shutdown.
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let records = load_catalog(&self.config.display.catalog_path)?;
        info!(
            "Loaded {} catalog records from {}",
            records.len(),
            self.config.display.catalog_path
        );

        let widgets = self.factory.create_widgets(
            &records,
            self.config.display.zone_id,
            self.config.display.display_id,
        );

        let rotation = Rotation::new(widgets, self.config.display.loop_budget_seconds);
        rotation.run(shutdown_rx).await;

        self.scheduler.shutdown();
        Ok(())
    }
}

/// Read the JSON array of widget records the catalog service produced.
/// A record that cannot be decoded is skipped; the rest still load.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CatalogRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;

    let records = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match CatalogRecord::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping catalog record {} in {}: {}", index, path.display(), e);
                None
            }
        })
        .collect();
    Ok(records)
}
