use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::{
    HotZoneResolver, TickConfig, TimePoint, TimelineEvent, Viewport, VirtualizationConfig,
};
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::TimelinePlugin;
use crate::interaction::{InteractionMode, PanZoomConfig, PanZoomController};
use crate::layout::TrackLayoutConfig;
use crate::sync::{BandSyncConfig, BandSyncCoordinator};

use super::band::BandState;
use super::{BandConfig, TimelineEngineConfig};

/// Main orchestration facade consumed by host applications.
///
/// `TimelineEngine` owns the event set, hot zones and one viewport plus
/// gesture controller per band, and keeps bands scrolling in step.
pub struct TimelineEngine {
    pub(super) bands: IndexMap<String, BandState>,
    pub(super) events: Vec<TimelineEvent>,
    pub(super) events_version: u64,
    pub(super) hot_zones: HotZoneResolver,
    pub(super) zones_version: u64,
    pub(super) sync: BandSyncCoordinator,
    pub(super) layout_config: TrackLayoutConfig,
    pub(super) virtualization: VirtualizationConfig,
    pub(super) tick_config: TickConfig,
    pub(super) interaction_config: PanZoomConfig,
    pub(super) config_version: u64,
    pub(super) plugins: Vec<Box<dyn TimelinePlugin>>,
}

impl fmt::Debug for TimelineEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineEngine")
            .field("bands", &self.bands.keys().collect::<Vec<_>>())
            .field("events", &self.events.len())
            .field("hot_zones", &self.hot_zones.len())
            .field("sync_state", self.sync.state())
            .field(
                "plugins",
                &self.plugins.iter().map(|plugin| plugin.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TimelineEngine {
    /// Creates an engine with every configured band centered on
    /// `config.initial_center`.
    pub fn new(config: TimelineEngineConfig) -> TimelineResult<Self> {
        let config = config.validate()?;
        let mut engine = Self {
            bands: IndexMap::new(),
            events: Vec::new(),
            events_version: 0,
            hot_zones: HotZoneResolver::with_base_magnification(config.base_magnification)?,
            zones_version: 0,
            sync: BandSyncCoordinator::new(),
            layout_config: config.layout,
            virtualization: config.virtualization,
            tick_config: config.ticks,
            interaction_config: config.interaction,
            config_version: 0,
            plugins: Vec::new(),
        };

        for band in config.bands {
            engine.insert_band(band, config.initial_center.as_f64())?;
        }
        debug!(bands = engine.bands.len(), "timeline engine initialized");
        Ok(engine)
    }

    /// Adds a band centered on the primary band's current center.
    pub fn add_band(&mut self, band: BandConfig) -> TimelineResult<()> {
        let center_ms = self
            .bands
            .values()
            .next()
            .map_or(0.0, |primary| primary.viewport.center_ms());
        self.insert_band(band, center_ms)
    }

    fn insert_band(&mut self, band: BandConfig, center_ms: f64) -> TimelineResult<()> {
        if band.id.is_empty() {
            return Err(TimelineError::InvalidData(
                "band id must not be empty".to_owned(),
            ));
        }
        if self.bands.contains_key(&band.id) {
            return Err(TimelineError::DuplicateBand(band.id));
        }

        let viewport = Viewport::new(
            TimePoint::saturating_from_f64_millis(center_ms),
            band.pixel_width,
            band.base_pixels_per_ms,
        )?
        .with_zoom_limits(band.zoom_limits)?
        .with_zoom_level(band.initial_zoom);
        let controller = PanZoomController::new(self.interaction_config)?;

        let mut sync_config = BandSyncConfig::new(band.id.clone(), band.sync_ratio);
        sync_config.is_master = band.is_master;
        self.sync.register_band(sync_config)?;

        debug!(band_id = %band.id, pixels_per_ms = viewport.pixels_per_ms(), "added band");
        self.bands.insert(
            band.id.clone(),
            BandState {
                config: band,
                viewport,
                controller,
                cached_layout: None,
            },
        );
        Ok(())
    }

    /// Removes a band. Returns `true` when it existed.
    pub fn remove_band(&mut self, band_id: &str) -> bool {
        let removed = self.bands.shift_remove(band_id).is_some();
        if removed {
            self.sync.unregister_band(band_id);
            debug!(band_id, "removed band");
        }
        removed
    }

    pub(super) fn band(&self, band_id: &str) -> TimelineResult<&BandState> {
        self.bands
            .get(band_id)
            .ok_or_else(|| TimelineError::UnknownBand(band_id.to_owned()))
    }

    pub(super) fn band_mut(&mut self, band_id: &str) -> TimelineResult<&mut BandState> {
        self.bands
            .get_mut(band_id)
            .ok_or_else(|| TimelineError::UnknownBand(band_id.to_owned()))
    }

    #[must_use]
    pub fn band_ids(&self) -> Vec<&str> {
        self.bands.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Master band, or the first registered band when none is flagged.
    #[must_use]
    pub fn primary_band(&self) -> Option<&str> {
        self.sync.master_band()
    }

    pub fn band_config(&self, band_id: &str) -> TimelineResult<&BandConfig> {
        Ok(&self.band(band_id)?.config)
    }

    pub fn viewport(&self, band_id: &str) -> TimelineResult<Viewport> {
        Ok(self.band(band_id)?.viewport)
    }

    pub fn interaction_mode(&self, band_id: &str) -> TimelineResult<InteractionMode> {
        Ok(self.band(band_id)?.controller.mode())
    }

    pub fn controller(&self, band_id: &str) -> TimelineResult<&PanZoomController> {
        Ok(&self.band(band_id)?.controller)
    }

    #[must_use]
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    #[must_use]
    pub fn hot_zones(&self) -> &HotZoneResolver {
        &self.hot_zones
    }

    #[must_use]
    pub fn sync(&self) -> &BandSyncCoordinator {
        &self.sync
    }

    #[must_use]
    pub fn layout_config(&self) -> TrackLayoutConfig {
        self.layout_config
    }

    pub fn set_layout_config(&mut self, config: TrackLayoutConfig) -> TimelineResult<()> {
        self.layout_config = config.validate()?;
        self.config_version += 1;
        Ok(())
    }

    #[must_use]
    pub fn virtualization_config(&self) -> VirtualizationConfig {
        self.virtualization
    }

    pub fn set_virtualization_config(
        &mut self,
        config: VirtualizationConfig,
    ) -> TimelineResult<()> {
        self.virtualization = config.validate()?;
        self.config_version += 1;
        Ok(())
    }

    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        self.tick_config
    }

    pub fn set_tick_config(&mut self, config: TickConfig) {
        self.tick_config = config;
    }

    #[must_use]
    pub fn interaction_config(&self) -> PanZoomConfig {
        self.interaction_config
    }

    /// Replaces the gesture config of every band.
    pub fn set_interaction_config(&mut self, config: PanZoomConfig) -> TimelineResult<()> {
        let config = config.validate()?;
        for band in self.bands.values_mut() {
            band.controller.set_config(config)?;
        }
        self.interaction_config = config;
        Ok(())
    }
}
