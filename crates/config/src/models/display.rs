use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// Which zone of which display this process drives, and where its widget
/// catalog comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    pub zone_id: i64,
    pub display_id: i64,
    pub catalog_path: String,
    /// Seconds left in a loop when the rotation asks widgets for slots.
    pub loop_budget_seconds: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            zone_id: 1,
            display_id: 1,
            catalog_path: "catalog.json".to_string(),
            loop_budget_seconds: 300,
        }
    }
}

impl ConfigValidator for DisplayConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.catalog_path, "display.catalog_path")?;
        ValidationUtils::validate_interval_seconds(
            self.loop_budget_seconds,
            "display.loop_budget_seconds",
        )?;
        Ok(())
    }
}
