use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Map, Value};
use signage_domain::{DailyForecast, HourlyForecast, WeatherData};
use signage_errors::SignageResult;

use super::temperature::TemperatureScale;

pub const MISSING_ICON: &str = "/images/weather_icon/na.png";
const WIND_DIRECTION_ICON: &str = "/images/weather_icon/wind/wind_dir2.png";

pub fn weather_icon(icon: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("/images/weather_icon/{version}/{icon}.png"),
        None => format!("/images/weather_icon/{icon}.png"),
    }
}

pub fn weather_background(icon: &str) -> String {
    format!("/images/weather_background/v1/{icon}.png")
}

/// Abbreviated weekday (`Mon`) of a unix timestamp at `offset`.
pub fn day_name(timestamp: i64, offset: FixedOffset) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(&offset).format("%a").to_string())
}

/// Display-ready weather, temperatures already converted and rounded.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WeatherReport {
    pub weather_locality_id: Option<i64>,
    pub currday_temp: Option<i64>,
    pub locality: Option<String>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub currday_icon: String,
    pub currday_background: Option<String>,
    pub wind_speed: Option<f64>,
    pub wind_direction_icon: Option<String>,
    pub wind_direction: Option<String>,
    pub feels_like: Option<i64>,

    pub today_hi: Option<i64>,
    pub today_low: Option<i64>,
    pub today_condition: Option<String>,

    pub tomorrow_day: Option<String>,
    pub tomorrow_hi: Option<i64>,
    pub tomorrow_low: Option<i64>,
    pub tomorrow_condition: Option<String>,
    pub tomorrow_icon: String,
    pub tomorrow_feels_like: Option<i64>,

    /// Forecast days after tomorrow; rendered as `day2_*`, `day3_*`, ...
    #[serde(skip)]
    pub later_days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ForecastDay {
    pub day: Option<String>,
    pub hi: Option<i64>,
    pub low: Option<i64>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub feels_like: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HourlyEntry {
    pub day: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub temp_high: Option<i64>,
    pub temp_low: Option<i64>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    pub feels_like: Option<i64>,
}

impl WeatherReport {
    /// Flatten into the object templates expect, with later days spread
    /// into numbered keys.
    pub fn template_value(&self) -> SignageResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut value {
            for (index, day) in self.later_days.iter().enumerate() {
                let prefix = format!("day{}", index + 2);
                insert_day(fields, &prefix, day)?;
            }
        }
        Ok(value)
    }
}

fn insert_day(fields: &mut Map<String, Value>, prefix: &str, day: &ForecastDay) -> SignageResult<()> {
    if let Value::Object(day_fields) = serde_json::to_value(day)? {
        for (key, value) in day_fields {
            fields.insert(format!("{prefix}_{key}"), value);
        }
    }
    Ok(())
}

/// Turns raw API data into a [`WeatherReport`] and hourly entries.
pub struct ReportBuilder<'a> {
    pub scale: TemperatureScale,
    pub icon_version: Option<&'a str>,
    pub offset: FixedOffset,
}

impl ReportBuilder<'_> {
    pub fn build(&self, data: &WeatherData) -> (WeatherReport, Vec<HourlyEntry>) {
        let mut report = WeatherReport {
            currday_icon: MISSING_ICON.to_string(),
            tomorrow_icon: MISSING_ICON.to_string(),
            ..WeatherReport::default()
        };

        if let Some(current) = data.current.first() {
            report.weather_locality_id = current.weather_locality_id;
            report.currday_temp = self.convert(current.temperature);
            report.locality = current.locality.clone();
            report.area = current.area.clone();
            report.description = current.description.clone();
            report.condition = current.condition.clone();
            if let Some(icon) = current.icon.as_deref() {
                report.currday_icon = weather_icon(icon, self.icon_version);
                report.currday_background = Some(weather_background(icon));
            }
            report.wind_speed = current.wind_speed;
            report.wind_direction_icon = Some(WIND_DIRECTION_ICON.to_string());
            report.wind_direction = current.wind_direction.clone();
            report.feels_like = self.convert(current.feels_like);
        }

        if let Some(today) = data.forecast.first() {
            report.today_hi = self.convert(today.temp_high);
            report.today_low = self.convert(today.temp_low);
            report.today_condition = today.condition.clone();
        }

        if let Some(tomorrow) = data.forecast.get(1) {
            let day = self.forecast_day(tomorrow);
            report.tomorrow_day = day.day;
            report.tomorrow_hi = day.hi;
            report.tomorrow_low = day.low;
            report.tomorrow_condition = day.condition;
            if let Some(icon) = day.icon {
                report.tomorrow_icon = icon;
            }
            report.tomorrow_feels_like = day.feels_like;
        }

        report.later_days = data
            .forecast
            .iter()
            .skip(2)
            .map(|day| self.forecast_day(day))
            .collect();

        let hourly = data.hourly.iter().map(|hour| self.hourly_entry(hour)).collect();

        (report, hourly)
    }

    fn convert(&self, celsius: Option<f64>) -> Option<i64> {
        celsius.map(|c| self.scale.display(c))
    }

    fn icon(&self, icon: Option<&str>) -> Option<String> {
        icon.map(|icon| weather_icon(icon, self.icon_version))
    }

    fn forecast_day(&self, day: &DailyForecast) -> ForecastDay {
        ForecastDay {
            day: day.timestamp.and_then(|ts| day_name(ts, self.offset)),
            hi: self.convert(day.temp_high),
            low: self.convert(day.temp_low),
            condition: day.condition.clone(),
            icon: self.icon(day.icon.as_deref()),
            feels_like: self.convert(day.feels_like),
        }
    }

    fn hourly_entry(&self, hour: &HourlyForecast) -> HourlyEntry {
        HourlyEntry {
            day: hour.timestamp.and_then(|ts| day_name(ts, self.offset)),
            date: hour.date.clone(),
            time: hour.time.clone(),
            temp_high: self.convert(hour.temp_high),
            temp_low: self.convert(hour.temp_low),
            condition: hour.condition.clone(),
            icon: self.icon(hour.icon.as_deref()),
            feels_like: self.convert(hour.feels_like),
        }
    }
}
