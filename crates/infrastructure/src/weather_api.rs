use std::time::Duration;

use async_trait::async_trait;
use signage_config::WeatherConfig;
use signage_domain::{WeatherApi, WeatherResponse};
use signage_errors::{SignageError, SignageResult};
use tracing::{debug, error};

/// Weather endpoint client: `GET {base}/weather?location=..&units=..`.
#[derive(Debug, Clone)]
pub struct HttpWeatherApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpWeatherApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SignageResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SignageError::config_error(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> SignageResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherApi for HttpWeatherApi {
    async fn get_weather(&self, location: &str, units: &str) -> SignageResult<WeatherResponse> {
        let url = self.endpoint();
        debug!("Fetching weather for {} from {}", location, url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("location", location), ("units", units)])
            .send()
            .await
            .map_err(|e| SignageError::fetch_error(format!("weather request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Weather API returned HTTP {} - {}", status, body);
            return Err(SignageError::fetch_error(format!(
                "weather API returned HTTP {status}"
            )));
        }

        response
            .json::<WeatherResponse>()
            .await
            .map_err(|e| SignageError::fetch_error(format!("invalid weather payload: {e}")))
    }
}
