use std::sync::Arc;

use signage_core::{Widget, WidgetCore};
use signage_domain::{RenderHost, WidgetProfile};

/// Widget with only the shared capabilities. Built for catalog types no
/// kind is registered for, so the display keeps running.
pub struct GenericWidget {
    core: WidgetCore,
}

impl GenericWidget {
    pub fn new(profile: WidgetProfile, render_host: Arc<dyn RenderHost>) -> Arc<Self> {
        Arc::new(Self {
            core: WidgetCore::new(profile, render_host),
        })
    }
}

impl Widget for GenericWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }
}
