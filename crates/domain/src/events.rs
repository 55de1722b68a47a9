//! Events delivered over the push channel.

use serde::{Deserialize, Serialize};

/// Fresh weather is available for `location`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherUpdate {
    pub location: String,
}
