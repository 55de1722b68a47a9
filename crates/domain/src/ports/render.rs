use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signage_errors::SignageResult;

use crate::entities::Layout;

/// Description of the wrapper a widget renders into.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SurfaceSpec {
    /// Zone the surface is attached to.
    pub zone_id: i64,
    pub element_id: String,
    pub data_name: Option<String>,
    pub classes: Vec<String>,
    /// Positioning and size overrides, e.g. `width -> 300px`.
    pub style: BTreeMap<String, String>,
    /// Operator supplied CSS appended after `style`.
    pub extra_css: Vec<String>,
}

impl SurfaceSpec {
    /// Inline style attribute as the render host should apply it.
    pub fn style_attribute(&self) -> String {
        let mut parts: Vec<String> = self
            .style
            .iter()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect();
        parts.extend(self.extra_css.iter().cloned());
        parts.join(";")
    }
}

/// What a widget asks the render collaborator to draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderContext {
    pub widget_id: Option<i64>,
    pub template: String,
    pub data: serde_json::Value,
    pub layout: Layout,
}

/// The render target a widget owns after initialization.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    fn element_id(&self) -> &str;
    fn layout(&self) -> Layout;
    async fn render(&self, context: RenderContext) -> SignageResult<()>;
    /// Remove everything previously rendered, keeping the surface itself.
    async fn clear(&self) -> SignageResult<()>;
}

#[async_trait]
pub trait RenderHost: Send + Sync {
    async fn acquire_surface(&self, spec: SurfaceSpec) -> SignageResult<Arc<dyn RenderSurface>>;
}
