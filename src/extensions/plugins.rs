use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::interaction::InteractionMode;

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub primary_band: Option<String>,
    pub primary_viewport: Option<Viewport>,
    pub primary_mode: Option<InteractionMode>,
    pub band_count: usize,
    pub events_len: usize,
    pub hot_zones_len: usize,
    pub sync_idle: bool,
}

/// Event stream exposed to plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PluginEvent {
    DataUpdated { events_len: usize, skipped: usize },
    HotZonesUpdated { zones_len: usize },
    ViewportChanged { band_id: String, start_ms: f64, end_ms: f64 },
    PanStarted { band_id: String },
    PanEnded { band_id: String },
    MomentumStarted { band_id: String, velocity_px_per_ms: f64 },
    MomentumEnded { band_id: String },
    ZoomChanged { band_id: String, zoom_level: f64 },
    /// A band moved because another band scrolled.
    BandScrolled { band_id: String, source: String, delta_px: f64 },
    LayoutComputed { band_id: String, placements: usize, track_count: usize },
}

impl PluginEvent {
    /// Band the event concerns, if any.
    #[must_use]
    pub fn band_id(&self) -> Option<&str> {
        match self {
            Self::DataUpdated { .. } | Self::HotZonesUpdated { .. } => None,
            Self::ViewportChanged { band_id, .. }
            | Self::PanStarted { band_id }
            | Self::PanEnded { band_id }
            | Self::MomentumStarted { band_id, .. }
            | Self::MomentumEnded { band_id }
            | Self::ZoomChanged { band_id, .. }
            | Self::BandScrolled { band_id, .. }
            | Self::LayoutComputed { band_id, .. } => Some(band_id),
        }
    }
}

/// Extension hook interface for bounded custom logic.
pub trait TimelinePlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &PluginEvent, context: &PluginContext);
}
