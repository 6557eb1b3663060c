//! Track layout: stacks events into vertical lanes so that labels and tapes
//! sharing a lane never overlap horizontally.
//!
//! Assignment is greedy first-fit over events sorted by `x`. It is stable for
//! identical input order but does not guarantee the minimal lane count.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{TimeMapping, TimelineEvent};
use crate::error::{TimelineError, TimelineResult};

#[cfg(feature = "parallel-layout")]
const PARALLEL_GEOMETRY_MIN_EVENTS: usize = 2_048;

/// Sizing constants used to estimate rendered event extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackLayoutConfig {
    pub dot_size_px: f64,
    pub label_char_width_px: f64,
    pub label_padding_px: f64,
    pub label_gap_px: f64,
    pub min_duration_width_px: f64,
    pub min_gap_px: f64,
    pub track_height_px: f64,
    pub tape_height_px: f64,
    pub show_labels: bool,
    pub extend_duration_with_label: bool,
}

impl Default for TrackLayoutConfig {
    fn default() -> Self {
        Self {
            dot_size_px: 10.0,
            label_char_width_px: 7.0,
            label_padding_px: 4.0,
            label_gap_px: 4.0,
            min_duration_width_px: 4.0,
            min_gap_px: 8.0,
            track_height_px: 24.0,
            tape_height_px: 6.0,
            show_labels: true,
            extend_duration_with_label: true,
        }
    }
}

impl TrackLayoutConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        for (value, name) in [
            (self.dot_size_px, "dot_size_px"),
            (self.label_char_width_px, "label_char_width_px"),
            (self.label_padding_px, "label_padding_px"),
            (self.label_gap_px, "label_gap_px"),
            (self.min_duration_width_px, "min_duration_width_px"),
            (self.min_gap_px, "min_gap_px"),
            (self.tape_height_px, "tape_height_px"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "layout config `{name}` must be finite and >= 0"
                )));
            }
        }
        if !self.track_height_px.is_finite() || self.track_height_px <= 0.0 {
            return Err(TimelineError::InvalidData(
                "layout config `track_height_px` must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Top edge of a track, tracks growing downward from 0.
    #[must_use]
    pub fn track_top_px(&self, track: usize) -> f64 {
        track as f64 * self.track_height_px
    }
}

/// Horizontal extent of one item to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSpan {
    pub x: f64,
    pub width: f64,
}

/// Estimated on-screen geometry of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventGeometry {
    pub x: f64,
    pub width: f64,
    pub is_duration: bool,
    pub end_x: Option<f64>,
    pub duration_width: Option<f64>,
}

/// Final placement of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventPlacement {
    /// Index into the event slice handed to the layout call.
    pub event_index: usize,
    pub x: f64,
    pub width: f64,
    pub track: usize,
    pub is_duration: bool,
    pub end_x: Option<f64>,
    pub duration_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Placements in ascending `x` order.
    pub placements: Vec<EventPlacement>,
    /// `1 + max(track)`, or 1 when empty.
    pub track_count: usize,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            placements: Vec::new(),
            track_count: 1,
        }
    }
}

impl TrackLayout {
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn on_track(&self, track: usize) -> impl Iterator<Item = &EventPlacement> {
        self.placements.iter().filter(move |p| p.track == track)
    }

    #[must_use]
    pub fn placement_for(&self, event_index: usize) -> Option<&EventPlacement> {
        self.placements
            .iter()
            .find(|placement| placement.event_index == event_index)
    }

    #[must_use]
    pub fn height_px(&self, config: &TrackLayoutConfig) -> f64 {
        self.track_count as f64 * config.track_height_px
    }
}

/// Monotonic estimate of a title's rendered width.
#[must_use]
pub fn estimate_label_width(title: &str, config: &TrackLayoutConfig) -> f64 {
    if title.is_empty() {
        return 0.0;
    }
    title.chars().count() as f64 * config.label_char_width_px + 2.0 * config.label_padding_px
}

#[must_use]
pub fn estimate_event_geometry(
    event: &TimelineEvent,
    mapper: &dyn TimeMapping,
    config: &TrackLayoutConfig,
) -> EventGeometry {
    let x = mapper.time_to_pixel(event.start);
    let label = if config.show_labels {
        let width = estimate_label_width(&event.title, config);
        if width > 0.0 { config.label_gap_px + width } else { 0.0 }
    } else {
        0.0
    };

    if !event.is_duration() {
        return EventGeometry {
            x,
            width: config.dot_size_px + label,
            is_duration: false,
            end_x: None,
            duration_width: None,
        };
    }

    let end_x = mapper.time_to_pixel(event.end_or_start());
    let duration_width = (end_x - x).max(config.min_duration_width_px);
    let width = if config.extend_duration_with_label {
        duration_width + label
    } else {
        duration_width
    };

    EventGeometry {
        x,
        width,
        is_duration: true,
        end_x: Some(end_x),
        duration_width: Some(duration_width),
    }
}

/// Greedy first-fit lane assignment.
///
/// Returns per-span tracks (parallel to `spans`) and the track count. Spans are
/// visited by ascending `x`, ties in input order; a span joins the first
/// track whose last right edge plus `min_gap` does not exceed its `x`.
#[must_use]
pub fn assign_tracks(spans: &[TrackSpan], min_gap: f64) -> (Vec<usize>, usize) {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&index| OrderedFloat(spans[index].x));

    let mut tracks = vec![0; spans.len()];
    let mut track_end = Vec::<f64>::new();
    for index in order {
        let span = spans[index];
        tracks[index] = allocate_track(&mut track_end, span.x, span.x + span.width, min_gap);
    }

    (tracks, track_end.len().max(1))
}

fn allocate_track(track_end: &mut Vec<f64>, left: f64, right: f64, min_gap: f64) -> usize {
    for (track, end) in track_end.iter_mut().enumerate() {
        if left >= *end + min_gap {
            *end = right;
            return track;
        }
    }
    track_end.push(right);
    track_end.len() - 1
}

/// Lays out every event in `events`.
pub fn layout_events(
    events: &[TimelineEvent],
    mapper: &dyn TimeMapping,
    config: TrackLayoutConfig,
) -> TimelineResult<TrackLayout> {
    let indices: Vec<usize> = (0..events.len()).collect();
    layout_event_subset(events, &indices, mapper, config)
}

/// Lays out the events selected by `indices` (e.g. a virtualized subset).
///
/// `EventPlacement::event_index` refers back into `events`. Out-of-range
/// indices are rejected.
pub fn layout_event_subset(
    events: &[TimelineEvent],
    indices: &[usize],
    mapper: &dyn TimeMapping,
    config: TrackLayoutConfig,
) -> TimelineResult<TrackLayout> {
    let config = config.validate()?;
    if let Some(&bad) = indices.iter().find(|&&index| index >= events.len()) {
        return Err(TimelineError::IndexOutOfRange {
            index: bad,
            len: events.len(),
        });
    }
    if indices.is_empty() {
        return Ok(TrackLayout::default());
    }

    let geometry = compute_geometry(events, indices, mapper, &config);
    let spans: Vec<TrackSpan> = geometry
        .iter()
        .map(|g| TrackSpan {
            x: g.x,
            width: g.width,
        })
        .collect();
    let (tracks, track_count) = assign_tracks(&spans, config.min_gap_px);

    let mut placements: Vec<EventPlacement> = indices
        .iter()
        .zip(geometry.iter().zip(tracks))
        .map(|(&event_index, (g, track))| EventPlacement {
            event_index,
            x: g.x,
            width: g.width,
            track,
            is_duration: g.is_duration,
            end_x: g.end_x,
            duration_width: g.duration_width,
        })
        .collect();
    placements.sort_by_key(|placement| OrderedFloat(placement.x));

    trace!(
        events = placements.len(),
        track_count, "computed track layout"
    );
    Ok(TrackLayout {
        placements,
        track_count,
    })
}

#[cfg(not(feature = "parallel-layout"))]
fn compute_geometry(
    events: &[TimelineEvent],
    indices: &[usize],
    mapper: &dyn TimeMapping,
    config: &TrackLayoutConfig,
) -> Vec<EventGeometry> {
    indices
        .iter()
        .map(|&index| estimate_event_geometry(&events[index], mapper, config))
        .collect()
}

#[cfg(feature = "parallel-layout")]
fn compute_geometry(
    events: &[TimelineEvent],
    indices: &[usize],
    mapper: &dyn TimeMapping,
    config: &TrackLayoutConfig,
) -> Vec<EventGeometry> {
    use rayon::prelude::*;

    if indices.len() < PARALLEL_GEOMETRY_MIN_EVENTS {
        return indices
            .iter()
            .map(|&index| estimate_event_geometry(&events[index], mapper, config))
            .collect();
    }
    indices
        .par_iter()
        .map(|&index| estimate_event_geometry(&events[index], mapper, config))
        .collect()
}
