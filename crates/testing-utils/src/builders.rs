//! Builders for catalog records and weather payloads with sensible
//! defaults.

use serde_json::{Map, Value};
use signage_domain::{
    CatalogRecord, CurrentConditions, DailyForecast, HourlyForecast, WeatherData,
    WeatherResponse,
};

pub struct CatalogRecordBuilder {
    record: CatalogRecord,
}

impl CatalogRecordBuilder {
    pub fn new(widget_type: &str, id: i64) -> Self {
        Self {
            record: CatalogRecord {
                widget_type: Some(widget_type.to_string()),
                id: Some(id),
                ..CatalogRecord::default()
            },
        }
    }

    pub fn weather(id: i64, zip: &str) -> Self {
        Self::new("weather", id).with_config("zip", Value::from(zip))
    }

    pub fn untyped(id: i64) -> Self {
        Self {
            record: CatalogRecord {
                id: Some(id),
                ..CatalogRecord::default()
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.record.name = Some(name.to_string());
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.record.duration = Some(duration);
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.record.priority = Some(priority);
        self
    }

    pub fn with_filler(mut self, filler: bool) -> Self {
        self.record.filler = Some(filler);
        self
    }

    pub fn with_custom_css_class(mut self, class: &str) -> Self {
        self.record.custom_css_class = Some(class.to_string());
        self
    }

    pub fn with_css_templates(mut self, raw_json: &str) -> Self {
        self.record.css_templates = Some(raw_json.to_string());
        self
    }

    pub fn with_config(mut self, property: &str, value: Value) -> Self {
        self.record
            .config
            .get_or_insert_with(Map::new)
            .insert(property.to_string(), value);
        self
    }

    pub fn build(self) -> CatalogRecord {
        self.record
    }
}

/// Weather payload with one current reading, `days` daily forecasts
/// starting at `start_timestamp`, and `hours` hourly entries.
pub struct WeatherResponseBuilder {
    data: WeatherData,
}

impl WeatherResponseBuilder {
    pub fn new() -> Self {
        Self {
            data: WeatherData::default(),
        }
    }

    pub fn with_current(mut self, temperature_c: f64, icon: &str) -> Self {
        self.data.current.push(CurrentConditions {
            weather_locality_id: Some(1),
            temperature: Some(temperature_c),
            locality: Some("New York".to_string()),
            area: Some("NY".to_string()),
            description: Some("Clear".to_string()),
            condition: Some("Clear".to_string()),
            icon: Some(icon.to_string()),
            wind_speed: Some(5.0),
            wind_direction: Some("NW".to_string()),
            feels_like: Some(temperature_c - 1.0),
        });
        self
    }

    pub fn with_days(mut self, start_timestamp: i64, days: usize) -> Self {
        for day in 0..days {
            self.data.forecast.push(DailyForecast {
                timestamp: Some(start_timestamp + day as i64 * 86_400),
                temp_high: Some(20.0 + day as f64),
                temp_low: Some(10.0 + day as f64),
                condition: Some("Cloudy".to_string()),
                icon: Some("cloudy".to_string()),
                feels_like: Some(15.0),
            });
        }
        self
    }

    pub fn with_hours(mut self, start_timestamp: i64, hours: usize) -> Self {
        for hour in 0..hours {
            self.data.hourly.push(HourlyForecast {
                timestamp: Some(start_timestamp + hour as i64 * 3_600),
                date: None,
                time: Some(format!("{}:00", hour)),
                temp_high: Some(18.0),
                temp_low: Some(12.0),
                condition: Some("Rain".to_string()),
                icon: Some("rain".to_string()),
                feels_like: Some(14.0),
            });
        }
        self
    }

    pub fn build(self) -> WeatherResponse {
        WeatherResponse { weather: self.data }
    }
}

impl Default for WeatherResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
