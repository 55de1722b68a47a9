use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherConfig {
    /// Seconds between scheduler firings (47 minutes).
    pub run_interval_seconds: u64,
    /// Content older than this is refetched on the next firing.
    pub staleness_threshold_seconds: u64,
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    /// Scale used when a widget's config has no `temperature_scale`.
    pub temperature_scale: String,
    /// Offset applied when turning forecast timestamps into day names.
    pub utc_offset_minutes: i32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            run_interval_seconds: 2820,
            staleness_threshold_seconds: 1800,
            api_base_url: "http://localhost:8080/api".to_string(),
            request_timeout_seconds: 30,
            temperature_scale: "f".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl ConfigValidator for WeatherConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_interval_seconds(
            self.run_interval_seconds,
            "weather.run_interval_seconds",
        )?;
        ValidationUtils::validate_interval_seconds(
            self.staleness_threshold_seconds,
            "weather.staleness_threshold_seconds",
        )?;
        ValidationUtils::validate_interval_seconds(
            self.request_timeout_seconds,
            "weather.request_timeout_seconds",
        )?;
        ValidationUtils::validate_url(&self.api_base_url, "weather.api_base_url")?;
        ValidationUtils::validate_not_empty(&self.temperature_scale, "weather.temperature_scale")?;

        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(crate::ConfigError::Validation(
                "weather.utc_offset_minutes must be within one day".to_string(),
            ));
        }

        Ok(())
    }
}
