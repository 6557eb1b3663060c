use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::date_parse::parse_time_point;
use crate::core::primitives::TimePoint;
use crate::error::{TimelineError, TimelineResult};

/// Point or duration entry on the timeline.
///
/// An event is a duration event when `end` is present or `duration` is set.
/// `end < start` is tolerated; layout clamps the resulting width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub start: TimePoint,
    #[serde(default)]
    pub end: Option<TimePoint>,
    pub title: String,
    #[serde(default)]
    pub duration: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TimelineEvent {
    #[must_use]
    pub fn point(id: impl Into<String>, start: TimePoint, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start,
            end: None,
            title: title.into(),
            duration: false,
            description: None,
            category: None,
        }
    }

    #[must_use]
    pub fn span(
        id: impl Into<String>,
        start: TimePoint,
        end: TimePoint,
        title: impl Into<String>,
    ) -> Self {
        Self::point(id, start, title).with_end(end)
    }

    #[must_use]
    pub fn with_end(mut self, end: TimePoint) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_duration_flag(mut self, duration: bool) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn is_duration(&self) -> bool {
        self.end.is_some() || self.duration
    }

    #[must_use]
    pub fn end_or_start(&self) -> TimePoint {
        self.end.unwrap_or(self.start)
    }

    /// Occupied interval in milliseconds, normalized so `lo <= hi`.
    #[must_use]
    pub fn interval_ms(&self) -> (f64, f64) {
        let start = self.start.as_f64();
        let end = self.end_or_start().as_f64();
        if end < start {
            (end, start)
        } else {
            (start, end)
        }
    }
}

/// String-dated event as produced by data loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_duration: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl RawEvent {
    pub fn parse(&self, index: usize) -> TimelineResult<TimelineEvent> {
        let start = parse_time_point(&self.start)?;
        let end = match self.end.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_time_point(value)?),
            _ => None,
        };

        Ok(TimelineEvent {
            id: self.id.clone().unwrap_or_else(|| format!("event-{index}")),
            start,
            end,
            title: self.title.clone(),
            duration: self.is_duration.unwrap_or(false),
            description: self.description.clone(),
            category: self.category.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub index: usize,
    pub error: TimelineError,
}

/// Outcome of a batch parse where bad items are skipped instead of aborting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseReport {
    pub accepted: usize,
    pub skipped: Vec<SkippedItem>,
}

impl ParseReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parses a batch of raw events, skipping items with unparsable dates.
pub fn parse_events(raw: &[RawEvent]) -> (Vec<TimelineEvent>, ParseReport) {
    let mut events = Vec::with_capacity(raw.len());
    let mut report = ParseReport::default();

    for (index, item) in raw.iter().enumerate() {
        match item.parse(index) {
            Ok(event) => {
                events.push(event);
                report.accepted += 1;
            }
            Err(error) => {
                warn!(index, error = %error, "skipping event with unparsable date");
                report.skipped.push(SkippedItem { index, error });
            }
        }
    }

    debug!(
        accepted = report.accepted,
        skipped = report.skipped.len(),
        "parsed event batch"
    );
    (events, report)
}
