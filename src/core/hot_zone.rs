use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::date_parse::parse_time_point;
use crate::core::event::{ParseReport, SkippedItem};
use crate::core::primitives::TimePoint;
use crate::core::ticks::TimeUnit;
use crate::error::{TimelineError, TimelineResult};

/// Time interval with a locally overridden magnification/resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotZone {
    pub start: TimePoint,
    pub end: TimePoint,
    pub magnify: f64,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default)]
    pub pixels_per_interval: Option<f64>,
    #[serde(default)]
    pub annotation: Option<String>,
}

impl HotZone {
    pub fn new(start: TimePoint, end: TimePoint, magnify: f64) -> TimelineResult<Self> {
        Self {
            start,
            end,
            magnify,
            unit: None,
            pixels_per_interval: None,
            annotation: None,
        }
        .validate()
    }

    #[must_use]
    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    #[must_use]
    pub fn with_pixels_per_interval(mut self, pixels: f64) -> Self {
        self.pixels_per_interval = Some(pixels);
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn validate(self) -> TimelineResult<Self> {
        if self.start > self.end {
            return Err(TimelineError::InvalidHotZone {
                reason: format!(
                    "start {} is after end {}",
                    self.start.millis(),
                    self.end.millis()
                ),
            });
        }
        if !self.magnify.is_finite() || self.magnify <= 0.0 {
            return Err(TimelineError::InvalidHotZone {
                reason: format!("magnify must be finite and > 0, got {}", self.magnify),
            });
        }
        if let Some(pixels) = self.pixels_per_interval {
            if !pixels.is_finite() || pixels <= 0.0 {
                return Err(TimelineError::InvalidHotZone {
                    reason: format!("pixels_per_interval must be finite and > 0, got {pixels}"),
                });
            }
        }
        Ok(self)
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, time: TimePoint) -> bool {
        self.start <= time && time <= self.end
    }

    fn contains_ms(&self, time_ms: f64) -> bool {
        self.start.as_f64() <= time_ms && time_ms <= self.end.as_f64()
    }

    #[must_use]
    pub fn intersects(&self, start: TimePoint, end: TimePoint) -> bool {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.start <= hi && self.end >= lo
    }
}

/// String-boundary form of a hot zone, as supplied by data loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHotZone {
    pub start: String,
    pub end: String,
    #[serde(default = "default_magnify")]
    pub magnify: f64,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default)]
    pub pixels_per_interval: Option<f64>,
    #[serde(default)]
    pub annotation: Option<String>,
}

fn default_magnify() -> f64 {
    1.0
}

impl RawHotZone {
    pub fn parse(&self) -> TimelineResult<HotZone> {
        let zone = HotZone {
            start: parse_time_point(&self.start)?,
            end: parse_time_point(&self.end)?,
            magnify: self.magnify,
            unit: self.unit,
            pixels_per_interval: self.pixels_per_interval,
            annotation: self.annotation.clone(),
        };
        zone.validate()
    }
}

/// Parses zones, skipping and reporting any that fail date parsing or validation.
pub fn parse_hot_zones(raw: &[RawHotZone]) -> (Vec<HotZone>, ParseReport) {
    let mut zones = Vec::with_capacity(raw.len());
    let mut report = ParseReport::default();
    for (index, item) in raw.iter().enumerate() {
        match item.parse() {
            Ok(zone) => {
                zones.push(zone);
                report.accepted += 1;
            }
            Err(error) => {
                warn!(index, error = %error, "skipping hot zone");
                report.skipped.push(SkippedItem { index, error });
            }
        }
    }
    (zones, report)
}

/// Effective override at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneResolution<'a> {
    pub magnification: f64,
    pub unit: Option<TimeUnit>,
    pub pixels_per_interval: Option<f64>,
    /// Zone that produced the maximum, `None` when no zone covers the instant.
    pub zone: Option<(usize, &'a HotZone)>,
}

/// Sub-range of constant effective magnification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnificationSegment {
    pub start_ms: f64,
    pub end_ms: f64,
    pub magnify: f64,
}

/// Registry of hot zones resolving overlaps by maximum magnification.
#[derive(Debug, Clone, PartialEq)]
pub struct HotZoneResolver {
    zones: Vec<HotZone>,
    base_magnification: f64,
}

impl Default for HotZoneResolver {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            base_magnification: 1.0,
        }
    }
}

impl HotZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_magnification(base_magnification: f64) -> TimelineResult<Self> {
        if !base_magnification.is_finite() || base_magnification <= 0.0 {
            return Err(TimelineError::InvalidData(
                "base magnification must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            zones: Vec::new(),
            base_magnification,
        })
    }

    #[must_use]
    pub fn base_magnification(&self) -> f64 {
        self.base_magnification
    }

    #[must_use]
    pub fn zones(&self) -> &[HotZone] {
        &self.zones
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Registers a zone and returns its index. Invalid zones leave state untouched.
    pub fn add_zone(&mut self, zone: HotZone) -> TimelineResult<usize> {
        let zone = zone.validate()?;
        debug!(
            start = zone.start.millis(),
            end = zone.end.millis(),
            magnify = zone.magnify,
            "register hot zone"
        );
        self.zones.push(zone);
        Ok(self.zones.len() - 1)
    }

    /// Replaces all zones; rejected as a whole when any zone is invalid.
    pub fn set_zones(&mut self, zones: Vec<HotZone>) -> TimelineResult<()> {
        let validated = zones
            .into_iter()
            .map(HotZone::validate)
            .collect::<TimelineResult<Vec<_>>>()?;
        self.zones = validated;
        Ok(())
    }

    pub fn remove_zone(&mut self, index: usize) -> TimelineResult<HotZone> {
        if index >= self.zones.len() {
            return Err(TimelineError::IndexOutOfRange {
                index,
                len: self.zones.len(),
            });
        }
        Ok(self.zones.remove(index))
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// Resolves the override at `time`.
    ///
    /// Magnification is the maximum across covering zones; unit and pixel
    /// density come from the zone that produced it, ties going to the
    /// earliest registered zone.
    #[must_use]
    pub fn resolve_at(&self, time: TimePoint) -> ZoneResolution<'_> {
        self.resolve_with(|zone| zone.contains(time))
    }

    #[must_use]
    pub fn magnification_at(&self, time: TimePoint) -> f64 {
        self.resolve_at(time).magnification
    }

    fn magnification_at_ms(&self, time_ms: f64) -> f64 {
        self.resolve_with(|zone| zone.contains_ms(time_ms))
            .magnification
    }

    fn resolve_with(&self, covers: impl Fn(&HotZone) -> bool) -> ZoneResolution<'_> {
        let mut best: Option<(usize, &HotZone)> = None;
        for (index, zone) in self.zones.iter().enumerate() {
            if !covers(zone) {
                continue;
            }
            match best {
                Some((_, current)) if zone.magnify <= current.magnify => {}
                _ => best = Some((index, zone)),
            }
        }

        match best {
            Some((index, zone)) => ZoneResolution {
                magnification: zone.magnify,
                unit: zone.unit,
                pixels_per_interval: zone.pixels_per_interval,
                zone: Some((index, zone)),
            },
            None => ZoneResolution {
                magnification: self.base_magnification,
                unit: None,
                pixels_per_interval: None,
                zone: None,
            },
        }
    }

    /// Zones whose `[start, end]` intersects the query range (either order).
    #[must_use]
    pub fn zones_in_range(&self, start: TimePoint, end: TimePoint) -> Vec<&HotZone> {
        self.zones
            .iter()
            .filter(|zone| zone.intersects(start, end))
            .collect()
    }

    /// Splits `[start_ms, end_ms]` into maximal sub-ranges of constant
    /// effective magnification.
    #[must_use]
    pub fn segments(&self, start_ms: f64, end_ms: f64) -> Vec<MagnificationSegment> {
        if !start_ms.is_finite() || !end_ms.is_finite() {
            return Vec::new();
        }
        let (lo, hi) = if start_ms <= end_ms {
            (start_ms, end_ms)
        } else {
            (end_ms, start_ms)
        };
        if lo == hi {
            return vec![MagnificationSegment {
                start_ms: lo,
                end_ms: hi,
                magnify: self.magnification_at_ms(lo),
            }];
        }

        let mut boundaries = vec![OrderedFloat(lo), OrderedFloat(hi)];
        for zone in &self.zones {
            for edge in [zone.start.as_f64(), zone.end.as_f64()] {
                if edge > lo && edge < hi {
                    boundaries.push(OrderedFloat(edge));
                }
            }
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut segments: Vec<MagnificationSegment> = Vec::with_capacity(boundaries.len());
        for pair in boundaries.windows(2) {
            let (a, b) = (pair[0].0, pair[1].0);
            let magnify = self.magnification_at_ms(a + (b - a) / 2.0);
            match segments.last_mut() {
                Some(last) if last.magnify == magnify => last.end_ms = b,
                _ => segments.push(MagnificationSegment {
                    start_ms: a,
                    end_ms: b,
                    magnify,
                }),
            }
        }
        segments
    }
}
