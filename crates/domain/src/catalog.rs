//! Catalog records as returned by the content API.
//!
//! Every field is optional: an absent field means "keep the widget's
//! default", so the factory applies records sparsely. The API still sends
//! some booleans as `0`/`1` and some numbers as strings, which the
//! deserializers below accept.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawCatalogRecord")]
pub struct CatalogRecord {
    #[serde(rename = "type")]
    pub widget_type: Option<String>,
    pub id: Option<i64>,
    pub name: Option<String>,
    /// JSON-encoded object of named CSS fragments.
    pub css_templates: Option<String>,
    pub custom_css_class: Option<String>,
    pub desaturation: Option<i64>,
    pub duration: Option<u64>,
    pub filler: Option<bool>,
    pub order: Option<i64>,
    pub priority: Option<i64>,
    pub repellent: Option<bool>,
    #[serde(rename = "override")]
    pub override_zone: Option<bool>,
    pub saturation: Option<i64>,
    pub minimum_loop_time: Option<u64>,
    pub config: Option<Map<String, Value>>,
}

impl CatalogRecord {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }
}

/// Wire shape. The legacy `widgetsid`/`widgetsname` keys may arrive next to
/// `id`/`name`; the legacy value wins.
#[derive(Deserialize)]
struct RawCatalogRecord {
    #[serde(rename = "type", default)]
    widget_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    widgetsid: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    widgetsname: Option<String>,
    #[serde(default)]
    css_templates: Option<String>,
    #[serde(default)]
    custom_css_class: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    desaturation: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    duration: Option<u64>,
    #[serde(default, deserialize_with = "flag")]
    filler: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i64")]
    order: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    priority: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    repellent: Option<bool>,
    #[serde(rename = "override", default, deserialize_with = "flag")]
    override_zone: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i64")]
    saturation: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    minimum_loop_time: Option<u64>,
    #[serde(default, deserialize_with = "config_entries")]
    config: Option<Map<String, Value>>,
}

impl From<RawCatalogRecord> for CatalogRecord {
    fn from(raw: RawCatalogRecord) -> Self {
        Self {
            widget_type: raw.widget_type,
            id: raw.widgetsid.or(raw.id),
            name: raw.widgetsname.or(raw.name),
            css_templates: raw.css_templates,
            custom_css_class: raw.custom_css_class,
            desaturation: raw.desaturation,
            duration: raw.duration,
            filler: raw.filler,
            order: raw.order,
            priority: raw.priority,
            repellent: raw.repellent,
            override_zone: raw.override_zone,
            saturation: raw.saturation,
            minimum_loop_time: raw.minimum_loop_time,
            config: raw.config,
        }
    }
}

/// Config arrives as an object, but an empty config is sent as `[]`.
/// Arrays contribute their elements keyed by index.
fn config_entries<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
        )),
        Some(other) => Err(serde::de::Error::custom(format!(
            "config must be an object, got {other}"
        ))),
    }
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|n| n != 0.0))),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" => Ok(Some(true)),
            "0" | "false" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!("invalid flag value: {other}"))),
        },
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid flag value: {other}"
        ))),
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("not an integer: {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "not an integer: {other}"
        ))),
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_i64(deserializer)?;
    value
        .map(|v| u64::try_from(v).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_api_record() {
        let record = CatalogRecord::from_json(
            r#"{
                "type": "weather",
                "widgetsid": 17,
                "widgetsname": "Front Door",
                "css_templates": "{\"header\": \"color: red\"}",
                "duration": 15,
                "filler": 0,
                "repellent": 1,
                "override": "0",
                "priority": 3,
                "minimum_loop_time": "30",
                "config": {"zip": "63701", "temperature_scale": "c"}
            }"#,
        )
        .unwrap();

        assert_eq!(record.widget_type.as_deref(), Some("weather"));
        assert_eq!(record.id, Some(17));
        assert_eq!(record.name.as_deref(), Some("Front Door"));
        assert_eq!(record.duration, Some(15));
        assert_eq!(record.filler, Some(false));
        assert_eq!(record.repellent, Some(true));
        assert_eq!(record.override_zone, Some(false));
        assert_eq!(record.priority, Some(3));
        assert_eq!(record.minimum_loop_time, Some(30));
        assert_eq!(record.config.unwrap()["zip"], json!("63701"));
    }

    #[test]
    fn test_absent_fields_stay_none() {
        let record = CatalogRecord::from_json(r#"{"id": 5}"#).unwrap();
        assert_eq!(record.id, Some(5));
        assert_eq!(record.priority, None);
        assert_eq!(record.duration, None);
        assert_eq!(record.filler, None);
        assert!(record.config.is_none());
    }

    #[test]
    fn test_rejects_negative_duration() {
        assert!(CatalogRecord::from_json(r#"{"duration": -4}"#).is_err());
    }

    #[test]
    fn test_empty_config_array_adds_nothing() {
        let record =
            CatalogRecord::from_json(r#"{"type":"weather","widgetsid":1,"config":[]}"#).unwrap();
        assert_eq!(record.id, Some(1));
        assert!(record.config.is_none());

        let record = CatalogRecord::from_json(r#"{"config": null}"#).unwrap();
        assert!(record.config.is_none());

        let record = CatalogRecord::from_json(r#"{"config": ["a"]}"#).unwrap();
        assert_eq!(record.config.unwrap()["0"], json!("a"));

        assert!(CatalogRecord::from_json(r#"{"config": 7}"#).is_err());
    }

    #[test]
    fn test_legacy_keys_win_over_canonical() {
        let record = CatalogRecord::from_json(
            r#"{"type":"weather","id":1,"widgetsid":9,"name":"New","widgetsname":"Old"}"#,
        )
        .unwrap();
        assert_eq!(record.id, Some(9));
        assert_eq!(record.name.as_deref(), Some("Old"));

        let record = CatalogRecord::from_json(r#"{"id": 4, "name": "Plain"}"#).unwrap();
        assert_eq!(record.id, Some(4));
        assert_eq!(record.name.as_deref(), Some("Plain"));
    }

    #[test]
    fn test_serialized_record_reads_back() {
        let record = CatalogRecord::from_json(r#"{"type":"ad","widgetsid":3,"override":1}"#).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], json!("ad"));
        assert_eq!(value["id"], json!(3));
        assert_eq!(CatalogRecord::from_value(value).unwrap(), record);
    }

    #[test]
    fn test_rejects_garbage_flag() {
        assert!(CatalogRecord::from_json(r#"{"filler": "maybe"}"#).is_err());
    }
}
