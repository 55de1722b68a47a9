use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use signage_domain::{Layout, RenderContext, RenderHost, RenderSurface, SurfaceSpec};
use signage_errors::SignageResult;
use tracing::{debug, info};

/// Render host for headless runs: every render request is logged instead
/// of drawn.
#[derive(Debug, Default)]
pub struct TracingRenderHost {
    default_layout: Layout,
}

impl TracingRenderHost {
    pub fn new(default_layout: Layout) -> Self {
        Self { default_layout }
    }

    fn layout_for(&self, spec: &SurfaceSpec) -> Layout {
        match (pixels(spec, "width"), pixels(spec, "height")) {
            (Some(width), Some(height)) => Layout::from_dimensions(width, height),
            _ => self.default_layout,
        }
    }
}

fn pixels(spec: &SurfaceSpec, property: &str) -> Option<u32> {
    spec.style
        .get(property)?
        .trim_end_matches("px")
        .trim()
        .parse()
        .ok()
}

#[async_trait]
impl RenderHost for TracingRenderHost {
    async fn acquire_surface(&self, spec: SurfaceSpec) -> SignageResult<Arc<dyn RenderSurface>> {
        let layout = self.layout_for(&spec);
        debug!(
            "Acquired surface {} in zone {} ({:?}, classes: {})",
            spec.element_id,
            spec.zone_id,
            layout,
            spec.classes.join(" ")
        );
        Ok(Arc::new(TracingSurface::new(spec, layout)))
    }
}

#[derive(Debug)]
pub struct TracingSurface {
    spec: SurfaceSpec,
    layout: Layout,
    renders: AtomicUsize,
}

impl TracingSurface {
    pub fn new(spec: SurfaceSpec, layout: Layout) -> Self {
        Self {
            spec,
            layout,
            renders: AtomicUsize::new(0),
        }
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderSurface for TracingSurface {
    fn element_id(&self) -> &str {
        &self.spec.element_id
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    async fn render(&self, context: RenderContext) -> SignageResult<()> {
        let payload = serde_json::to_string(&context.data)?;
        self.renders.fetch_add(1, Ordering::SeqCst);
        info!(
            "Render {} into {} ({} bytes of data)",
            context.template,
            self.spec.element_id,
            payload.len()
        );
        Ok(())
    }

    async fn clear(&self) -> SignageResult<()> {
        debug!("Cleared surface {}", self.spec.element_id);
        Ok(())
    }
}
