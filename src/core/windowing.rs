use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::event::TimelineEvent;
use crate::error::{TimelineError, TimelineResult};

/// Extra time kept on each side of the visible range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BufferSize {
    Millis(f64),
    /// Fraction of the visible span.
    ViewportFraction(f64),
}

impl BufferSize {
    #[must_use]
    pub fn resolve(self, visible_span_ms: f64) -> f64 {
        match self {
            Self::Millis(ms) => ms,
            Self::ViewportFraction(fraction) => fraction * visible_span_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualizationConfig {
    pub enabled: bool,
    /// Culling engages only when the input holds at least this many events.
    pub threshold: usize,
    pub buffer: BufferSize,
    /// Per-event estimate feeding `estimated_memory_saved_bytes`.
    pub bytes_per_event: usize,
}

impl Default for VirtualizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 100,
            buffer: BufferSize::ViewportFraction(0.5),
            bytes_per_event: 256,
        }
    }
}

impl VirtualizationConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        let value = match self.buffer {
            BufferSize::Millis(value) | BufferSize::ViewportFraction(value) => value,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(TimelineError::InvalidData(
                "virtualization buffer must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualizationStats {
    pub total: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub render_percentage: f64,
    pub estimated_memory_saved_bytes: usize,
}

impl VirtualizationStats {
    fn new(total: usize, rendered: usize, bytes_per_event: usize) -> Self {
        let skipped = total.saturating_sub(rendered);
        let render_percentage = if total == 0 {
            100.0
        } else {
            rendered as f64 / total as f64 * 100.0
        };
        Self {
            total,
            rendered,
            skipped,
            render_percentage,
            estimated_memory_saved_bytes: skipped.saturating_mul(bytes_per_event),
        }
    }
}

/// Culling result. `indices` point into the input slice, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualizedEvents {
    pub indices: Vec<usize>,
    pub is_virtualized: bool,
    pub buffered_range: Option<(f64, f64)>,
    /// Events ending strictly before the buffered range.
    pub before_count: usize,
    /// Events starting strictly after the buffered range.
    pub after_count: usize,
    pub stats: VirtualizationStats,
}

impl VirtualizedEvents {
    pub fn events<'a>(
        &'a self,
        events: &'a [TimelineEvent],
    ) -> impl Iterator<Item = &'a TimelineEvent> + 'a {
        self.indices.iter().filter_map(move |&index| events.get(index))
    }
}

/// Indices of events whose interval intersects an inclusive time window.
#[must_use]
pub fn events_in_time_window(events: &[TimelineEvent], start: f64, end: f64) -> Vec<usize> {
    let (min_t, max_t) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };

    events
        .iter()
        .enumerate()
        .filter(|(_, event)| {
            let (lo, hi) = event.interval_ms();
            hi >= min_t && lo <= max_t
        })
        .map(|(index, _)| index)
        .collect()
}

/// Reduces `events` to those worth laying out for `visible_range`.
///
/// Below the threshold (or when disabled) every index is returned and
/// `is_virtualized` is `false`.
pub fn virtualize_events(
    events: &[TimelineEvent],
    visible_range: (f64, f64),
    config: VirtualizationConfig,
) -> TimelineResult<VirtualizedEvents> {
    let config = config.validate()?;
    let (start, end) = visible_range;
    if !start.is_finite() || !end.is_finite() {
        return Err(TimelineError::InvalidData(
            "visible range must be finite".to_owned(),
        ));
    }

    let total = events.len();
    if !config.enabled || total < config.threshold {
        return Ok(VirtualizedEvents {
            indices: (0..total).collect(),
            is_virtualized: false,
            buffered_range: None,
            before_count: 0,
            after_count: 0,
            stats: VirtualizationStats::new(total, total, config.bytes_per_event),
        });
    }

    let (lo, hi) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };
    let buffer = config.buffer.resolve(hi - lo);
    let buffered_start = lo - buffer;
    let buffered_end = hi + buffer;

    let indices = events_in_time_window(events, buffered_start, buffered_end);
    let mut before_count = 0;
    let mut after_count = 0;
    for event in events {
        let (event_lo, event_hi) = event.interval_ms();
        if event_hi < buffered_start {
            before_count += 1;
        } else if event_lo > buffered_end {
            after_count += 1;
        }
    }

    let stats = VirtualizationStats::new(total, indices.len(), config.bytes_per_event);
    trace!(
        total,
        rendered = stats.rendered,
        before_count,
        after_count,
        "virtualized event set"
    );

    Ok(VirtualizedEvents {
        indices,
        is_virtualized: true,
        buffered_range: Some((buffered_start, buffered_end)),
        before_count,
        after_count,
        stats,
    })
}
