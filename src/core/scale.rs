use serde::{Deserialize, Serialize};

use crate::core::hot_zone::MagnificationSegment;
use crate::core::primitives::TimePoint;
use crate::core::types::Viewport;
use crate::error::{TimelineError, TimelineResult};

/// `(t - origin) * pixels_per_ms`.
#[must_use]
pub fn to_pixel(time_ms: f64, origin_ms: f64, pixels_per_ms: f64) -> f64 {
    (time_ms - origin_ms) * pixels_per_ms
}

/// `origin + px / pixels_per_ms`.
#[must_use]
pub fn to_time(pixel: f64, origin_ms: f64, pixels_per_ms: f64) -> f64 {
    origin_ms + pixel / pixels_per_ms
}

/// Time <-> pixel mapping consumed by layout and tick generation.
///
/// `Sync` so geometry can be sampled from worker threads.
pub trait TimeMapping: Send + Sync {
    fn ms_to_pixel(&self, time_ms: f64) -> f64;
    fn pixel_to_ms(&self, pixel: f64) -> f64;

    fn time_to_pixel(&self, time: TimePoint) -> f64 {
        self.ms_to_pixel(time.as_f64())
    }

    fn pixel_to_time(&self, pixel: f64) -> TimePoint {
        TimePoint::saturating_from_f64_millis(self.pixel_to_ms(pixel))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTimeMapper {
    origin_ms: f64,
    pixels_per_ms: f64,
}

impl LinearTimeMapper {
    pub fn new(origin_ms: f64, pixels_per_ms: f64) -> TimelineResult<Self> {
        if !origin_ms.is_finite() {
            return Err(TimelineError::InvalidData(
                "mapper origin must be finite".to_owned(),
            ));
        }
        if !pixels_per_ms.is_finite() || pixels_per_ms <= 0.0 {
            return Err(TimelineError::InvalidData(
                "pixels per ms must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            origin_ms,
            pixels_per_ms,
        })
    }

    /// Mapping whose origin is the viewport's left edge.
    #[must_use]
    pub fn from_viewport(viewport: &Viewport) -> Self {
        Self {
            origin_ms: viewport.origin_ms(),
            pixels_per_ms: viewport.pixels_per_ms(),
        }
    }

    #[must_use]
    pub fn origin_ms(self) -> f64 {
        self.origin_ms
    }

    #[must_use]
    pub fn pixels_per_ms(self) -> f64 {
        self.pixels_per_ms
    }
}

impl TimeMapping for LinearTimeMapper {
    fn ms_to_pixel(&self, time_ms: f64) -> f64 {
        to_pixel(time_ms, self.origin_ms, self.pixels_per_ms)
    }

    fn pixel_to_ms(&self, pixel: f64) -> f64 {
        to_time(pixel, self.origin_ms, self.pixels_per_ms)
    }
}

/// Piecewise-linear mapping with per-segment magnification.
///
/// Inside a segment one millisecond spans `pixels_per_ms * magnify` pixels.
/// Outside the covered segments the `outside_magnify` factor applies. The
/// mapping is pinned so that `anchor_ms` lands on `anchor_px`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedTimeMapper {
    pixels_per_ms: f64,
    outside_magnify: f64,
    segments: Vec<MagnificationSegment>,
    segment_start_px: Vec<f64>,
    shift_px: f64,
}

impl SegmentedTimeMapper {
    /// Builds the mapper from contiguous, ascending segments.
    pub fn new(
        pixels_per_ms: f64,
        outside_magnify: f64,
        segments: Vec<MagnificationSegment>,
        anchor_ms: f64,
        anchor_px: f64,
    ) -> TimelineResult<Self> {
        if !pixels_per_ms.is_finite() || pixels_per_ms <= 0.0 {
            return Err(TimelineError::InvalidData(
                "pixels per ms must be finite and > 0".to_owned(),
            ));
        }
        if !outside_magnify.is_finite() || outside_magnify <= 0.0 {
            return Err(TimelineError::InvalidData(
                "base magnification must be finite and > 0".to_owned(),
            ));
        }
        if !anchor_ms.is_finite() || !anchor_px.is_finite() {
            return Err(TimelineError::InvalidData(
                "mapper anchor must be finite".to_owned(),
            ));
        }
        for pair in segments.windows(2) {
            if pair[0].end_ms != pair[1].start_ms {
                return Err(TimelineError::InvalidData(
                    "magnification segments must be contiguous".to_owned(),
                ));
            }
        }
        for segment in &segments {
            if !(segment.end_ms >= segment.start_ms)
                || !segment.magnify.is_finite()
                || segment.magnify <= 0.0
            {
                return Err(TimelineError::InvalidData(
                    "magnification segment must be ordered with magnify > 0".to_owned(),
                ));
            }
        }

        let mut segment_start_px = Vec::with_capacity(segments.len());
        let mut cursor = 0.0;
        for segment in &segments {
            segment_start_px.push(cursor);
            cursor += (segment.end_ms - segment.start_ms) * pixels_per_ms * segment.magnify;
        }

        let mut mapper = Self {
            pixels_per_ms,
            outside_magnify,
            segments,
            segment_start_px,
            shift_px: 0.0,
        };
        mapper.shift_px = anchor_px - mapper.raw_pixel(anchor_ms);
        Ok(mapper)
    }

    /// Segmented mapping for a viewport, anchored at its center.
    pub fn for_viewport(
        viewport: &Viewport,
        outside_magnify: f64,
        segments: Vec<MagnificationSegment>,
    ) -> TimelineResult<Self> {
        Self::new(
            viewport.pixels_per_ms(),
            outside_magnify,
            segments,
            viewport.center_ms(),
            viewport.pixel_width() / 2.0,
        )
    }

    #[must_use]
    pub fn segments(&self) -> &[MagnificationSegment] {
        &self.segments
    }

    fn outside_scale(&self) -> f64 {
        self.pixels_per_ms * self.outside_magnify
    }

    fn covered_end_px(&self) -> f64 {
        match (self.segments.last(), self.segment_start_px.last()) {
            (Some(last), Some(start_px)) => {
                start_px + (last.end_ms - last.start_ms) * self.pixels_per_ms * last.magnify
            }
            _ => 0.0,
        }
    }

    fn raw_pixel(&self, time_ms: f64) -> f64 {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return time_ms * self.outside_scale();
        };

        if time_ms <= first.start_ms {
            return (time_ms - first.start_ms) * self.outside_scale();
        }
        if time_ms >= last.end_ms {
            return self.covered_end_px() + (time_ms - last.end_ms) * self.outside_scale();
        }

        let index = self
            .segments
            .partition_point(|segment| segment.start_ms <= time_ms)
            .saturating_sub(1);
        let segment = &self.segments[index];
        self.segment_start_px[index]
            + (time_ms - segment.start_ms) * self.pixels_per_ms * segment.magnify
    }

    fn raw_to_ms(&self, raw_px: f64) -> f64 {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return raw_px / self.outside_scale();
        };

        if raw_px <= 0.0 {
            return first.start_ms + raw_px / self.outside_scale();
        }
        let covered_end = self.covered_end_px();
        if raw_px >= covered_end {
            return last.end_ms + (raw_px - covered_end) / self.outside_scale();
        }

        let index = self
            .segment_start_px
            .partition_point(|start| *start <= raw_px)
            .saturating_sub(1);
        let segment = &self.segments[index];
        segment.start_ms
            + (raw_px - self.segment_start_px[index]) / (self.pixels_per_ms * segment.magnify)
    }
}

impl TimeMapping for SegmentedTimeMapper {
    fn ms_to_pixel(&self, time_ms: f64) -> f64 {
        self.raw_pixel(time_ms) + self.shift_px
    }

    fn pixel_to_ms(&self, pixel: f64) -> f64 {
        self.raw_to_ms(pixel - self.shift_px)
    }
}
