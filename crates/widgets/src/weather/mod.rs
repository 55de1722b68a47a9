//! Weather widget: current conditions and forecast for a zip code,
//! refreshed on a timer and on push notifications.

mod report;
mod temperature;

pub use report::{
    day_name, weather_background, weather_icon, ForecastDay, HourlyEntry, ReportBuilder,
    WeatherReport, MISSING_ICON,
};
pub use temperature::TemperatureScale;

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::json;
use signage_config::WeatherConfig;
use signage_core::{bind_scheduler_action, ScheduledWidget, SchedulerSlot, Widget, WidgetCore};
use signage_domain::{
    Layout, MessagingClient, PeriodicScheduler, RenderHost, TimelineSlot, WeatherApi,
    WeatherResponse, WidgetProfile,
};
use signage_errors::SignageResult;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const WEATHER_TYPE: &str = "weather";
const TEMPLATE: &str = "weather";

pub struct WeatherWidget {
    core: WidgetCore,
    scheduler: SchedulerSlot,
    api: Arc<dyn WeatherApi>,
    messaging: Option<Arc<dyn MessagingClient>>,
    settings: WeatherConfig,
    self_ref: Weak<WeatherWidget>,
    last_update: Mutex<Option<DateTime<Utc>>>,
    report: Mutex<Option<WeatherReport>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl WeatherWidget {
    pub fn new(
        profile: WidgetProfile,
        render_host: Arc<dyn RenderHost>,
        scheduler: Arc<dyn PeriodicScheduler>,
        api: Arc<dyn WeatherApi>,
        messaging: Option<Arc<dyn MessagingClient>>,
        settings: WeatherConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<WeatherWidget>| {
            let scheduler =
                SchedulerSlot::new(scheduler, &profile, bind_scheduler_action(weak.clone()))
                    .with_run_interval(Duration::from_secs(settings.run_interval_seconds));
            Self {
                core: WidgetCore::new(profile, render_host),
                scheduler,
                api,
                messaging,
                settings,
                self_ref: weak.clone(),
                last_update: Mutex::new(None),
                report: Mutex::new(None),
                listener: Mutex::new(None),
            }
        })
    }

    /// Kind defaults applied before the catalog record.
    pub fn default_profile(zone_id: i64, display_id: i64) -> WidgetProfile {
        let mut profile = WidgetProfile::new(zone_id, display_id);
        profile.widget_type = Some(WEATHER_TYPE.to_string());
        profile
    }

    pub fn zip(&self) -> Option<&str> {
        self.core.profile().config_str("zip")
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self
            .last_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The report built from the last successful fetch.
    pub fn report(&self) -> Option<WeatherReport> {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn temperature_scale(&self) -> TemperatureScale {
        let configured = self
            .core
            .profile()
            .config_str("temperature_scale")
            .unwrap_or(&self.settings.temperature_scale);
        configured.parse().unwrap_or_else(|e| {
            warn!(
                "Widget {}: {}, falling back to fahrenheit",
                self.core.label(),
                e
            );
            TemperatureScale::Fahrenheit
        })
    }

    /// Fetch fresh weather and re-render. Failures are logged; the last
    /// rendered content stays on screen.
    pub async fn refresh(&self) {
        let zip = self.zip().unwrap_or_default().to_string();
        match self.api.get_weather(&zip, "c").await {
            Ok(response) => self.apply(&zip, response).await,
            Err(e) => {
                error!(
                    "Failed to fetch weather for widget {} ({}): {}",
                    self.core.label(),
                    zip,
                    e
                );
                if self.last_update().is_none() {
                    self.core.set_has_content_to_play(false);
                }
            }
        }
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.last_update() {
            None => true,
            Some(last) => {
                let threshold =
                    chrono::Duration::seconds(self.settings.staleness_threshold_seconds as i64);
                last < now - threshold
            }
        }
    }

    async fn apply(&self, zip: &str, response: WeatherResponse) {
        let has_content = !zip.is_empty();
        let now = Utc::now();
        self.core.set_has_content_to_play(has_content);
        *self
            .last_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(now);

        if !has_content {
            return;
        }

        let icon_version = self.icon_version();
        let builder = ReportBuilder {
            scale: self.temperature_scale(),
            icon_version: icon_version.as_deref(),
            offset: self.utc_offset(),
        };
        let (report, hourly) = builder.build(&response.weather);

        if let Err(e) = self.render_report(&report, &hourly, now).await {
            error!(
                "Failed to render widget content ({}): {}",
                self.core.label(),
                e
            );
        }

        *self.report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
    }

    async fn render_report(
        &self,
        report: &WeatherReport,
        hourly: &[HourlyEntry],
        updated_at: DateTime<Utc>,
    ) -> SignageResult<()> {
        let layout = self.core.layout();
        let context = json!({
            "wid": self.core.id().map(|id| id.to_string()),
            "weather": report.template_value()?,
            "hourly": hourly,
            "lastUpdated": updated_at.timestamp_millis(),
            "landscape": layout == Layout::Landscape,
            "portrait": layout == Layout::Portrait,
        });
        self.core.render(TEMPLATE, context).await
    }

    fn icon_version(&self) -> Option<String> {
        match self.core.profile().config.get("icon_version")? {
            serde_json::Value::Null => None,
            serde_json::Value::String(version) => Some(version.clone()),
            other => Some(other.to_string()),
        }
    }

    fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.settings.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }

    fn spawn_listener(&self, messaging: &Arc<dyn MessagingClient>) {
        let mut updates = messaging.weather_updates();
        let widget = self.self_ref.clone();
        let zip = self.zip().map(str::to_string);
        let label = self.core.label();

        let handle = tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        let Some(widget) = widget.upgrade() else {
                            break;
                        };
                        if zip.as_deref() == Some(update.location.as_str()) {
                            info!(
                                "Received push notification for weather location {}",
                                update.location
                            );
                            widget.refresh().await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Weather listener of {} skipped {} updates", label, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Weather listener of {} finished", label);
        });

        if let Some(previous) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle)
        {
            previous.abort();
        }
    }
}

#[async_trait]
impl Widget for WeatherWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn scheduler(&self) -> Option<&SchedulerSlot> {
        Some(&self.scheduler)
    }

    async fn on_initialize(&self) -> SignageResult<()> {
        let Some(messaging) = self.messaging.clone() else {
            return Ok(());
        };

        self.spawn_listener(&messaging);

        match self.zip() {
            Some(zip) if !zip.is_empty() => match messaging.subscribe_to_weather(zip).await {
                Ok(()) => debug!(
                    "Weather widget subscribed. widgetsid={:?}, zip={}",
                    self.core.id(),
                    zip
                ),
                Err(e) => error!("Failed to subscribe to channel {}: {}", zip, e),
            },
            _ => warn!(
                "Weather widget {} has no zip; not subscribing to updates",
                self.core.label()
            ),
        }

        Ok(())
    }

    async fn prepare_for_display(&self, _current: &TimelineSlot) -> SignageResult<()> {
        self.refresh().await;
        Ok(())
    }
}

#[async_trait]
impl ScheduledWidget for WeatherWidget {
    async fn scheduler_action(&self) {
        if !self.is_stale(Utc::now()) {
            debug!("Weather widget {} is fresh; skipping refresh", self.core.label());
            return;
        }
        if self.last_update().is_some() {
            warn!(
                "Weather widget is stale ({}); will update from API",
                self.core.label()
            );
        }
        self.refresh().await;
    }
}

impl Drop for WeatherWidget {
    fn drop(&mut self) {
        if let Some(listener) = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            listener.abort();
        }
    }
}
