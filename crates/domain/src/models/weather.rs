use serde::{Deserialize, Serialize};

/// Payload of the weather endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherResponse {
    pub weather: WeatherData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherData {
    #[serde(default)]
    pub current: Vec<CurrentConditions>,
    #[serde(default)]
    pub forecast: Vec<DailyForecast>,
    #[serde(default)]
    pub hourly: Vec<HourlyForecast>,
}

/// Temperatures are in Celsius; the widget converts for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurrentConditions {
    pub weather_locality_id: Option<i64>,
    pub temperature: Option<f64>,
    pub locality: Option<String>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DailyForecast {
    /// Unix seconds.
    pub timestamp: Option<i64>,
    pub temp_high: Option<f64>,
    pub temp_low: Option<f64>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HourlyForecast {
    pub timestamp: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub temp_high: Option<f64>,
    pub temp_low: Option<f64>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub feels_like: Option<f64>,
}
