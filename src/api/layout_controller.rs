use tracing::trace;

use crate::core::{
    HotZone, SegmentedTimeMapper, TickMark, TickStep, TimeMapping, TimePoint, TimelineEvent,
    VirtualizationStats, events_in_time_window, generate_ticks, select_tick_step, virtualize_events,
};
use crate::error::TimelineResult;
use crate::layout::layout_event_subset;

use super::band::{BandLayout, BandState, LayoutCacheKey};
use super::{PluginEvent, TimelineEngine};

impl TimelineEngine {
    /// Time/pixel mapping of a band, stretched by hot zones when the band
    /// applies them and anchored at the band's center.
    pub fn band_mapper(&self, band_id: &str) -> TimelineResult<SegmentedTimeMapper> {
        let band = self.band(band_id)?;
        self.mapper_for(band)
    }

    fn mapper_for(&self, band: &BandState) -> TimelineResult<SegmentedTimeMapper> {
        let viewport = &band.viewport;
        let base = self.hot_zones.base_magnification();
        if !band.config.apply_hot_zones || self.hot_zones.is_empty() {
            return SegmentedTimeMapper::for_viewport(viewport, base, Vec::new());
        }

        let (start, end) = viewport.visible_range();
        let buffer = self.virtualization.buffer.resolve(end - start);
        let segments = self.hot_zones.segments(start - buffer, end + buffer);
        SegmentedTimeMapper::for_viewport(viewport, base, segments)
    }

    /// Time range on screen for a band under its mapping.
    pub fn visible_range(&self, band_id: &str) -> TimelineResult<(f64, f64)> {
        let band = self.band(band_id)?;
        let mapper = self.mapper_for(band)?;
        Ok(band.visible_range_for(&mapper))
    }

    /// Virtualized track layout for a band's current viewport.
    ///
    /// Results are cached until the viewport, events, hot zones or layout
    /// configuration change.
    pub fn band_layout(&mut self, band_id: &str) -> TimelineResult<BandLayout> {
        let band = self.band(band_id)?;
        let key = LayoutCacheKey {
            viewport: band.viewport.cache_key(),
            events_version: self.events_version,
            zones_version: self.zones_version,
            config_version: self.config_version,
        };
        if let Some((cached_key, layout)) = &band.cached_layout {
            if *cached_key == key {
                trace!(band_id, "band layout cache hit");
                return Ok(layout.clone());
            }
        }

        let mapper = self.mapper_for(band)?;
        let visible_range = band.visible_range_for(&mapper);
        let virtualized = virtualize_events(&self.events, visible_range, self.virtualization)?;
        let layout = layout_event_subset(
            &self.events,
            &virtualized.indices,
            &mapper,
            self.layout_config,
        )?;
        let result = BandLayout {
            band_id: band_id.to_owned(),
            visible_range,
            virtualized,
            layout,
        };

        self.band_mut(band_id)?.cached_layout = Some((key, result.clone()));
        self.emit_plugin_event(PluginEvent::LayoutComputed {
            band_id: band_id.to_owned(),
            placements: result.layout.len(),
            track_count: result.layout.track_count,
        });
        Ok(result)
    }

    /// Events intersecting a band's on-screen range, in input order.
    pub fn visible_events(&self, band_id: &str) -> TimelineResult<Vec<&TimelineEvent>> {
        let (start, end) = self.visible_range(band_id)?;
        Ok(events_in_time_window(&self.events, start, end)
            .into_iter()
            .map(|index| &self.events[index])
            .collect())
    }

    /// Tick marks for a band at an automatically selected granularity.
    ///
    /// A hot zone covering the band's center with an explicit unit forces
    /// that unit.
    pub fn ticks(&self, band_id: &str) -> TimelineResult<Vec<TickMark>> {
        let band = self.band(band_id)?;
        let mapper = self.mapper_for(band)?;
        let (start, end) = band.visible_range_for(&mapper);

        let center = TimePoint::saturating_from_f64_millis(band.viewport.center_ms());
        let (magnification, zone_unit) = if band.config.apply_hot_zones {
            let resolution = self.hot_zones.resolve_at(center);
            (resolution.magnification, resolution.unit)
        } else {
            (self.hot_zones.base_magnification(), None)
        };
        let step = self
            .tick_config
            .forced_step
            .or_else(|| zone_unit.map(|unit| TickStep { unit, multiple: 1 }))
            .unwrap_or_else(|| {
                select_tick_step(
                    band.viewport.pixels_per_ms() * magnification,
                    self.tick_config.target_spacing_px,
                )
            });
        generate_ticks(&mapper, start, end, step, self.tick_config)
    }

    /// Hot zones intersecting a band's on-screen range.
    pub fn active_hot_zones(&self, band_id: &str) -> TimelineResult<Vec<&HotZone>> {
        let (start, end) = self.visible_range(band_id)?;
        Ok(self.hot_zones.zones_in_range(
            TimePoint::saturating_from_f64_millis(start.floor()),
            TimePoint::saturating_from_f64_millis(end.ceil()),
        ))
    }

    pub fn virtualization_stats(&mut self, band_id: &str) -> TimelineResult<VirtualizationStats> {
        Ok(self.band_layout(band_id)?.virtualized.stats)
    }

    /// Maps a band-local pixel to time.
    pub fn pixel_to_time(&self, band_id: &str, pixel: f64) -> TimelineResult<TimePoint> {
        Ok(self.band_mapper(band_id)?.pixel_to_time(pixel))
    }

    /// Maps a time to a band-local pixel.
    pub fn time_to_pixel(&self, band_id: &str, time: TimePoint) -> TimelineResult<f64> {
        Ok(self.band_mapper(band_id)?.time_to_pixel(time))
    }
}
