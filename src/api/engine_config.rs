use serde::{Deserialize, Serialize};

use crate::core::{TickConfig, TimePoint, TimeUnit, VirtualizationConfig, ZoomLimits};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::PanZoomConfig;
use crate::layout::TrackLayoutConfig;

/// One horizontal strip of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    pub id: String,
    #[serde(default = "default_pixel_width")]
    pub pixel_width: f64,
    pub base_pixels_per_ms: f64,
    #[serde(default)]
    pub zoom_limits: ZoomLimits,
    #[serde(default = "default_zoom_level")]
    pub initial_zoom: f64,
    #[serde(default = "default_sync_ratio")]
    pub sync_ratio: f64,
    #[serde(default)]
    pub is_master: bool,
    /// Hot-zone magnification stretches this band's mapping.
    #[serde(default = "default_apply_hot_zones")]
    pub apply_hot_zones: bool,
}

impl BandConfig {
    #[must_use]
    pub fn new(id: impl Into<String>, base_pixels_per_ms: f64) -> Self {
        Self {
            id: id.into(),
            pixel_width: default_pixel_width(),
            base_pixels_per_ms,
            zoom_limits: ZoomLimits::default(),
            initial_zoom: default_zoom_level(),
            sync_ratio: default_sync_ratio(),
            is_master: false,
            apply_hot_zones: default_apply_hot_zones(),
        }
    }

    /// Band whose scale shows one `unit` per `pixels_per_interval` pixels.
    #[must_use]
    pub fn from_interval(id: impl Into<String>, unit: TimeUnit, pixels_per_interval: f64) -> Self {
        Self::new(id, pixels_per_interval / unit.approx_millis())
    }

    #[must_use]
    pub fn with_pixel_width(mut self, pixel_width: f64) -> Self {
        self.pixel_width = pixel_width;
        self
    }

    #[must_use]
    pub fn with_zoom_limits(mut self, zoom_limits: ZoomLimits) -> Self {
        self.zoom_limits = zoom_limits;
        self
    }

    #[must_use]
    pub fn with_initial_zoom(mut self, zoom: f64) -> Self {
        self.initial_zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_sync_ratio(mut self, sync_ratio: f64) -> Self {
        self.sync_ratio = sync_ratio;
        self
    }

    #[must_use]
    pub fn master(mut self) -> Self {
        self.is_master = true;
        self
    }

    #[must_use]
    pub fn with_hot_zones_applied(mut self, apply: bool) -> Self {
        self.apply_hot_zones = apply;
        self
    }
}

/// Public engine bootstrap configuration.
///
/// Serializable so hosts can persist and reload a timeline setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEngineConfig {
    pub bands: Vec<BandConfig>,
    #[serde(default = "default_initial_center")]
    pub initial_center: TimePoint,
    #[serde(default = "default_base_magnification")]
    pub base_magnification: f64,
    #[serde(default)]
    pub layout: TrackLayoutConfig,
    #[serde(default)]
    pub virtualization: VirtualizationConfig,
    #[serde(default)]
    pub interaction: PanZoomConfig,
    #[serde(default)]
    pub ticks: TickConfig,
}

impl TimelineEngineConfig {
    #[must_use]
    pub fn new(initial_center: TimePoint) -> Self {
        Self {
            bands: Vec::new(),
            initial_center,
            base_magnification: default_base_magnification(),
            layout: TrackLayoutConfig::default(),
            virtualization: VirtualizationConfig::default(),
            interaction: PanZoomConfig::default(),
            ticks: TickConfig::default(),
        }
    }

    #[must_use]
    pub fn with_band(mut self, band: BandConfig) -> Self {
        self.bands.push(band);
        self
    }

    #[must_use]
    pub fn with_base_magnification(mut self, base_magnification: f64) -> Self {
        self.base_magnification = base_magnification;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: TrackLayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_virtualization(mut self, virtualization: VirtualizationConfig) -> Self {
        self.virtualization = virtualization;
        self
    }

    #[must_use]
    pub fn with_interaction(mut self, interaction: PanZoomConfig) -> Self {
        self.interaction = interaction;
        self
    }

    #[must_use]
    pub fn with_ticks(mut self, ticks: TickConfig) -> Self {
        self.ticks = ticks;
        self
    }

    /// Validates the nested configs and the band list.
    pub fn validate(self) -> TimelineResult<Self> {
        if self.bands.is_empty() {
            return Err(TimelineError::InvalidData(
                "timeline needs at least one band".to_owned(),
            ));
        }
        for (index, band) in self.bands.iter().enumerate() {
            if band.id.is_empty() {
                return Err(TimelineError::InvalidData(
                    "band id must not be empty".to_owned(),
                ));
            }
            if self.bands[..index].iter().any(|other| other.id == band.id) {
                return Err(TimelineError::DuplicateBand(band.id.clone()));
            }
        }
        if !self.base_magnification.is_finite() || self.base_magnification <= 0.0 {
            return Err(TimelineError::InvalidData(
                "base magnification must be finite and > 0".to_owned(),
            ));
        }
        self.layout.validate()?;
        self.virtualization.validate()?;
        self.interaction.validate()?;
        Ok(self)
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TimelineError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| TimelineError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_pixel_width() -> f64 {
    1_000.0
}

fn default_zoom_level() -> f64 {
    1.0
}

fn default_sync_ratio() -> f64 {
    1.0
}

fn default_apply_hot_zones() -> bool {
    true
}

fn default_initial_center() -> TimePoint {
    TimePoint::from_millis(0)
}

fn default_base_magnification() -> f64 {
    1.0
}
