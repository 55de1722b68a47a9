use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Where a widget sits in its lifecycle. Only the lifecycle operations move
/// a widget between states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WidgetState {
    #[serde(rename = "CREATED")]
    Created,
    #[serde(rename = "STOPPED")]
    Stopped,
    #[serde(rename = "PLAYING")]
    Playing,
    #[serde(rename = "PAUSED")]
    Paused,
}

impl WidgetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetState::Created => "CREATED",
            WidgetState::Stopped => "STOPPED",
            WidgetState::Playing => "PLAYING",
            WidgetState::Paused => "PAUSED",
        }
    }
    pub fn is_initialized(&self) -> bool {
        !matches!(self, WidgetState::Created)
    }
    pub fn can_play(&self) -> bool {
        matches!(self, WidgetState::Stopped | WidgetState::Paused)
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orientation of the surface a widget renders into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Landscape,
    Portrait,
}

impl Layout {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > width {
            Layout::Portrait
        } else {
            Layout::Landscape
        }
    }
}

/// Identity and placement of a widget, fixed once the factory has populated
/// it from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetProfile {
    pub id: Option<i64>,
    pub widget_type: Option<String>,
    pub name: Option<String>,
    /// `name` with double quotes escaped, safe to embed in templates.
    pub safe_name: Option<String>,
    pub zone_id: i64,
    pub display_id: i64,
    /// Seconds one slot of this widget occupies.
    pub duration: u64,
    pub order: i64,
    pub priority: i64,
    pub saturation: Option<i64>,
    pub desaturation: Option<i64>,
    pub repellent: bool,
    pub override_zone: bool,
    pub filler: bool,
    pub minimum_loop_time: u64,
    pub custom_css_class: Option<String>,
    pub css_templates: HashMap<String, Value>,
    pub config: HashMap<String, Value>,
}

pub const DEFAULT_DURATION_SECONDS: u64 = 10;
pub const DEFAULT_MINIMUM_LOOP_TIME_SECONDS: u64 = 10;

impl WidgetProfile {
    pub fn new(zone_id: i64, display_id: i64) -> Self {
        Self {
            id: None,
            widget_type: None,
            name: None,
            safe_name: None,
            zone_id,
            display_id,
            duration: DEFAULT_DURATION_SECONDS,
            order: 0,
            priority: 0,
            saturation: None,
            desaturation: None,
            repellent: false,
            override_zone: false,
            filler: false,
            minimum_loop_time: DEFAULT_MINIMUM_LOOP_TIME_SECONDS,
            custom_css_class: None,
            css_templates: HashMap::new(),
            config: HashMap::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.safe_name = Some(escape_quotes(&name));
        self.name = Some(name);
    }

    pub fn add_configuration_metadata(&mut self, property: impl Into<String>, value: Value) {
        self.config.insert(property.into(), value);
    }

    pub fn config_str(&self, property: &str) -> Option<&str> {
        self.config.get(property).and_then(Value::as_str)
    }

    /// Short label used in log lines, e.g. `weather:12`.
    pub fn label(&self) -> String {
        format!(
            "{}:{}",
            self.widget_type.as_deref().unwrap_or("widget"),
            display_or_null(self.id)
        )
    }

    /// Deterministic key correlating slots that belong to one continuous
    /// presentation.
    pub fn group_identifier(&self, group_id: &str) -> String {
        format!(
            "widget_{}_{}_group_{}",
            display_or_null(self.id),
            self.safe_name.as_deref().unwrap_or("null"),
            group_id
        )
    }

    pub fn widget_ref(&self) -> WidgetRef {
        WidgetRef {
            id: self.id,
            widget_type: self.widget_type.clone(),
            safe_name: self.safe_name.clone(),
        }
    }
}

pub fn escape_quotes(name: &str) -> String {
    name.replace('"', "\\\"")
}

fn display_or_null(id: Option<i64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "null".to_string())
}

/// Non-owning handle back to the widget a slot was generated by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetRef {
    pub id: Option<i64>,
    pub widget_type: Option<String>,
    pub safe_name: Option<String>,
}

/// A bounded-duration allocation of playback time requested by a widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSlot {
    pub widget: WidgetRef,
    pub duration: u64,
    pub params: Option<Map<String, Value>>,
    pub group_identifier: Option<String>,
}

impl TimelineSlot {
    pub fn widget_id(&self) -> Option<i64> {
        self.widget.id
    }
    pub fn belongs_to_same_widget(&self, other: &TimelineSlot) -> bool {
        self.widget.id == other.widget.id
    }
}

/// Result of the `before_fade_out` hook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FadeOut {
    pub cancel_fade: bool,
}
