use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    display::DisplayConfig,
    logging::LogConfig,
    widgets::WeatherConfig,
};
use crate::validation::ConfigValidator;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub weather: WeatherConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("weather.run_interval_seconds", 2820)?
            .set_default("weather.staleness_threshold_seconds", 1800)?
            .set_default("weather.api_base_url", "http://localhost:8080/api")?
            .set_default("weather.request_timeout_seconds", 30)?
            .set_default("weather.temperature_scale", "f")?
            .set_default("weather.utc_offset_minutes", 0)?
            .set_default("display.zone_id", 1)?
            .set_default("display.display_id", 1)?
            .set_default("display.catalog_path", "catalog.json")?
            .set_default("display.loop_budget_seconds", 300)?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("config file not found: {}", path));
            }
        } else {
            let default_paths = [
                "config/signage.toml",
                "signage.toml",
                "/etc/signage/config.toml",
            ];

            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("SIGNAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config as TOML")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.logging.validate()?;
        self.weather.validate()?;
        self.display.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogLevel, OutputFormat};
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weather.run_interval_seconds, 2820);
        assert_eq!(config.display.zone_id, 1);
    }

    #[test]
    fn test_toml_roundtrip_keeps_sections() {
        let config = AppConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[weather]"));
        assert!(toml_str.contains("run_interval_seconds = 2820"));

        let parsed = AppConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[logging]
level = "debug"
format = "json"

[weather]
run_interval_seconds = 600
temperature_scale = "c"

[display]
zone_id = 4
catalog_path = "/var/lib/signage/catalog.json"
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, OutputFormat::Json);
        assert_eq!(config.weather.run_interval_seconds, 600);
        assert_eq!(config.weather.temperature_scale, "c");
        // untouched keys fall back to defaults
        assert_eq!(config.weather.staleness_threshold_seconds, 1800);
        assert_eq!(config.display.zone_id, 4);
        assert_eq!(config.display.display_id, 1);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load(Some("/definitely/not/here/signage.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let mut config = AppConfig::default();
        config.weather.run_interval_seconds = 0;
        let toml_str = config.to_toml().unwrap();
        assert!(AppConfig::from_toml(&toml_str).is_err());
    }
}
