use tracing::{debug, trace};

use crate::core::TimePoint;
use crate::error::{TimelineError, TimelineResult};
use crate::sync::{BandScrollCallback, GlobalScrollCallback, SyncPropagation};

use super::{PluginEvent, TimelineEngine};

impl TimelineEngine {
    /// Programmatic scroll of `band_id` by `delta_px` content pixels,
    /// propagated to the other bands.
    ///
    /// Returns the propagation, or `None` when the sync guard dropped it.
    pub fn scroll_band(
        &mut self,
        band_id: &str,
        delta_px: f64,
    ) -> TimelineResult<Option<SyncPropagation>> {
        if !delta_px.is_finite() {
            return Err(TimelineError::InvalidData(
                "scroll delta must be finite".to_owned(),
            ));
        }
        let band = self.band_mut(band_id)?;
        band.viewport.pan_by_pixels(delta_px);
        self.viewport_changed(band_id);
        Ok(self.propagate_scroll(band_id, delta_px))
    }

    /// Centers every band on `time`.
    pub fn center_on(&mut self, time: TimePoint) {
        let band_ids: Vec<String> = self.bands.keys().cloned().collect();
        for band_id in band_ids {
            if let Some(band) = self.bands.get_mut(&band_id) {
                band.controller.cancel_momentum();
                band.viewport.set_center_time(time);
            }
            self.viewport_changed(&band_id);
        }
        debug!(center_ms = time.millis(), "centered all bands");
    }

    pub fn set_band_zoom(&mut self, band_id: &str, zoom_level: f64) -> TimelineResult<bool> {
        let band = self.band_mut(band_id)?;
        if !band.viewport.set_zoom_level(zoom_level) {
            return Ok(false);
        }
        let zoom_level = band.viewport.zoom_level();
        self.emit_plugin_event(PluginEvent::ZoomChanged {
            band_id: band_id.to_owned(),
            zoom_level,
        });
        self.viewport_changed(band_id);
        Ok(true)
    }

    /// Updates a band's pixel width, e.g. after a host resize.
    pub fn resize_band(&mut self, band_id: &str, pixel_width: f64) -> TimelineResult<()> {
        self.band_mut(band_id)?.viewport.resize(pixel_width)?;
        trace!(band_id, pixel_width, "resized band");
        self.viewport_changed(band_id);
        Ok(())
    }

    pub fn set_sync_ratio(&mut self, band_id: &str, sync_ratio: f64) -> TimelineResult<()> {
        self.sync.set_sync_ratio(band_id, sync_ratio)?;
        self.band_mut(band_id)?.config.sync_ratio = sync_ratio;
        Ok(())
    }

    pub fn set_band_scroll_callback(
        &mut self,
        band_id: &str,
        on_scroll: Option<BandScrollCallback>,
    ) -> TimelineResult<()> {
        self.sync.set_band_callback(band_id, on_scroll)
    }

    pub fn set_global_scroll_callback(&mut self, on_scroll: Option<GlobalScrollCallback>) {
        self.sync.set_global_callback(on_scroll);
    }

    /// Applies the synced deltas of a scroll on `source` to the other bands.
    ///
    /// Each host input is its own tick: the guard covers the synchronous
    /// fan-out below and is cleared once every target has moved.
    pub(super) fn propagate_scroll(
        &mut self,
        source: &str,
        delta_px: f64,
    ) -> Option<SyncPropagation> {
        let propagation = self.sync.notify_scroll(source, delta_px)?;
        for target in propagation.targets() {
            if let Some(band) = self.bands.get_mut(&target.band_id) {
                band.viewport.pan_by_pixels(target.delta_px);
            }
            self.emit_plugin_event(PluginEvent::BandScrolled {
                band_id: target.band_id.clone(),
                source: source.to_owned(),
                delta_px: target.delta_px,
            });
            self.viewport_changed(&target.band_id);
        }
        self.sync.on_next_tick();
        Some(propagation)
    }

    pub(super) fn viewport_changed(&mut self, band_id: &str) {
        let Some(band) = self.bands.get(band_id) else {
            return;
        };
        let (start_ms, end_ms) = band.viewport.visible_range();
        self.emit_plugin_event(PluginEvent::ViewportChanged {
            band_id: band_id.to_owned(),
            start_ms,
            end_ms,
        });
    }
}
