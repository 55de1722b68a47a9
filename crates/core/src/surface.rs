use serde_json::Value;
use signage_domain::{SurfaceSpec, WidgetProfile};

/// Config keys copied into the surface style, with the CSS property and
/// whether the value is a pixel length.
const STYLE_KEYS: [(&str, &str, bool); 5] = [
    ("width", "width", true),
    ("height", "height", true),
    ("z", "z-index", false),
    ("x", "left", true),
    ("y", "top", true),
];

const CSS_KEYS: [&str; 2] = ["css", "gui_css"];

/// Describe the wrapper a widget renders into from its profile.
pub fn surface_spec(profile: &WidgetProfile) -> SurfaceSpec {
    let widget_type = profile.widget_type.as_deref().unwrap_or("general");

    let mut classes = vec!["widget".to_string(), format!("widget-{widget_type}")];
    if let Some(custom) = profile
        .custom_css_class
        .as_deref()
        .filter(|custom| !custom.is_empty())
    {
        classes.push(format!("custom-{widget_type}-{custom}"));
    }

    let mut spec = SurfaceSpec {
        zone_id: profile.zone_id,
        element_id: format!(
            "widget_{}",
            profile
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "null".to_string())
        ),
        data_name: profile.name.clone(),
        classes,
        ..SurfaceSpec::default()
    };

    for (key, property, pixels) in STYLE_KEYS {
        if let Some(value) = profile.config.get(key).filter(|v| value_not_empty(v)) {
            let value = css_value(value);
            let value = if pixels { format!("{value}px") } else { value };
            spec.style.insert(property.to_string(), value);
        }
    }

    for key in CSS_KEYS {
        if let Some(value) = profile.config.get(key).filter(|v| value_not_empty(v)) {
            spec.extra_css.push(css_value(value));
        }
    }

    spec
}

/// Absent, null, empty string, zero and `false` all count as "not set".
pub fn value_not_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn css_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
