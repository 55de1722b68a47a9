use async_trait::async_trait;
use signage_errors::SignageResult;
use tokio::sync::broadcast;

use crate::events::WeatherUpdate;
use crate::models::WeatherResponse;

#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Fetch current conditions and forecasts for `location` in `units`
    /// (`"c"` or `"f"`).
    async fn get_weather(&self, location: &str, units: &str) -> SignageResult<WeatherResponse>;
}

/// Push channel carrying content-invalidation events.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    fn weather_updates(&self) -> broadcast::Receiver<WeatherUpdate>;
    async fn subscribe_to_weather(&self, location: &str) -> SignageResult<()>;
}
