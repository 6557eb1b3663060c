use serde::{Deserialize, Serialize};

use crate::core::primitives::TimePoint;
use crate::core::scale::{LinearTimeMapper, TimeMapping};
use crate::error::{TimelineError, TimelineResult};

/// Inclusive zoom bounds for a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_zoom: 0.01,
            max_zoom: 100.0,
        }
    }
}

impl ZoomLimits {
    pub fn new(min_zoom: f64, max_zoom: f64) -> TimelineResult<Self> {
        Self { min_zoom, max_zoom }.validate()
    }

    pub(crate) fn validate(self) -> TimelineResult<Self> {
        if !self.min_zoom.is_finite()
            || !self.max_zoom.is_finite()
            || self.min_zoom <= 0.0
            || self.max_zoom < self.min_zoom
        {
            return Err(TimelineError::InvalidData(format!(
                "zoom limits must be finite, > 0 and ordered: [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(self)
    }

    #[must_use]
    pub fn clamp(self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Visible window of one timeline band.
///
/// The center is tracked in fractional milliseconds so sub-millisecond drags at
/// deep zoom levels accumulate instead of being rounded away.
/// Visible range is `center +/- (pixel_width / 2) / pixels_per_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    center_ms: f64,
    pixel_width: f64,
    base_pixels_per_ms: f64,
    zoom_level: f64,
    zoom_limits: ZoomLimits,
}

impl Viewport {
    pub fn new(
        center_time: TimePoint,
        pixel_width: f64,
        base_pixels_per_ms: f64,
    ) -> TimelineResult<Self> {
        if !pixel_width.is_finite()
            || pixel_width <= 0.0
            || !base_pixels_per_ms.is_finite()
            || base_pixels_per_ms <= 0.0
        {
            return Err(TimelineError::InvalidViewport {
                width: pixel_width,
                pixels_per_ms: base_pixels_per_ms,
            });
        }

        Ok(Self {
            center_ms: center_time.as_f64(),
            pixel_width,
            base_pixels_per_ms,
            zoom_level: 1.0,
            zoom_limits: ZoomLimits::default(),
        })
    }

    /// Replaces zoom limits and re-clamps the current zoom level.
    pub fn with_zoom_limits(mut self, limits: ZoomLimits) -> TimelineResult<Self> {
        self.zoom_limits = limits.validate()?;
        self.zoom_level = limits.clamp(self.zoom_level);
        Ok(self)
    }

    /// Sets the initial zoom level, saturating at the configured limits.
    #[must_use]
    pub fn with_zoom_level(mut self, zoom_level: f64) -> Self {
        self.set_zoom_level(zoom_level);
        self
    }

    #[must_use]
    pub fn center_ms(&self) -> f64 {
        self.center_ms
    }

    #[must_use]
    pub fn center_time(&self) -> TimePoint {
        TimePoint::saturating_from_f64_millis(self.center_ms)
    }

    #[must_use]
    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    #[must_use]
    pub fn base_pixels_per_ms(&self) -> f64 {
        self.base_pixels_per_ms
    }

    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    #[must_use]
    pub fn zoom_limits(&self) -> ZoomLimits {
        self.zoom_limits
    }

    #[must_use]
    pub fn pixels_per_ms(&self) -> f64 {
        self.base_pixels_per_ms * self.zoom_level
    }

    #[must_use]
    pub fn half_span_ms(&self) -> f64 {
        (self.pixel_width / 2.0) / self.pixels_per_ms()
    }

    #[must_use]
    pub fn visible_span_ms(&self) -> f64 {
        self.pixel_width / self.pixels_per_ms()
    }

    /// Left edge of the viewport; the origin of the linear mapping.
    #[must_use]
    pub fn origin_ms(&self) -> f64 {
        self.center_ms - self.half_span_ms()
    }

    #[must_use]
    pub fn visible_range(&self) -> (f64, f64) {
        let half = self.half_span_ms();
        (self.center_ms - half, self.center_ms + half)
    }

    #[must_use]
    pub fn visible_time_range(&self) -> (TimePoint, TimePoint) {
        let (start, end) = self.visible_range();
        (
            TimePoint::saturating_from_f64_millis(start),
            TimePoint::saturating_from_f64_millis(end),
        )
    }

    #[must_use]
    pub fn contains(&self, time: TimePoint) -> bool {
        let (start, end) = self.visible_range();
        let value = time.as_f64();
        value >= start && value <= end
    }

    #[must_use]
    pub fn mapper(&self) -> LinearTimeMapper {
        LinearTimeMapper::from_viewport(self)
    }

    pub fn set_center_time(&mut self, center: TimePoint) {
        self.center_ms = center.as_f64();
    }

    /// Shifts the center by a time delta. Non-finite deltas are ignored.
    pub fn pan_by_time(&mut self, delta_ms: f64) -> bool {
        if !delta_ms.is_finite() || delta_ms == 0.0 {
            return false;
        }
        self.center_ms += delta_ms;
        true
    }

    /// Moves content by `delta_px` pixels.
    ///
    /// Content moving right means the view moves backward in time, so the
    /// applied time delta is `-delta_px / pixels_per_ms`. Returns that delta.
    pub fn pan_by_pixels(&mut self, delta_px: f64) -> f64 {
        if !delta_px.is_finite() || delta_px == 0.0 {
            return 0.0;
        }
        let delta_ms = -delta_px / self.pixels_per_ms();
        self.pan_by_time(delta_ms);
        delta_ms
    }

    /// Sets the zoom level, saturating silently at the configured limits.
    ///
    /// Returns `true` when the effective zoom changed.
    pub fn set_zoom_level(&mut self, zoom_level: f64) -> bool {
        if !zoom_level.is_finite() || zoom_level <= 0.0 {
            return false;
        }
        let clamped = self.zoom_limits.clamp(zoom_level);
        let changed = clamped != self.zoom_level;
        self.zoom_level = clamped;
        changed
    }

    /// Multiplies the zoom level; `factor > 1.0` zooms in.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        self.set_zoom_level(self.zoom_level * factor)
    }

    /// Zooms while keeping the instant under `anchor_px` fixed on screen.
    pub fn zoom_by_around(&mut self, factor: f64, anchor_px: f64) -> bool {
        if !anchor_px.is_finite() {
            return self.zoom_by(factor);
        }
        let anchor_ms = self.mapper().pixel_to_ms(anchor_px);
        if !self.zoom_by(factor) {
            return false;
        }
        let offset_px = anchor_px - self.pixel_width / 2.0;
        self.center_ms = anchor_ms - offset_px / self.pixels_per_ms();
        true
    }

    pub fn resize(&mut self, pixel_width: f64) -> TimelineResult<()> {
        if !pixel_width.is_finite() || pixel_width <= 0.0 {
            return Err(TimelineError::InvalidViewport {
                width: pixel_width,
                pixels_per_ms: self.pixels_per_ms(),
            });
        }
        self.pixel_width = pixel_width;
        Ok(())
    }

    /// Bitwise fingerprint of the mapping-relevant state, used as a cache key.
    #[must_use]
    pub fn cache_key(&self) -> [u64; 3] {
        [
            self.center_ms.to_bits(),
            self.pixel_width.to_bits(),
            self.pixels_per_ms().to_bits(),
        ]
    }
}
