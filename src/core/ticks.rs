use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::primitives::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, TimePoint};
use crate::core::scale::TimeMapping;
use crate::core::types::Viewport;
use crate::error::{TimelineError, TimelineResult};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const AVG_MONTH_MS: f64 = 30.436_875 * MS_PER_DAY as f64;
const AVG_YEAR_MS: f64 = 365.2425 * MS_PER_DAY as f64;

/// Calendar granularity used for ticks and hot-zone resolution overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    Decade,
    Century,
    Millennium,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 11] = [
        Self::Millisecond,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
        Self::Decade,
        Self::Century,
        Self::Millennium,
    ];

    /// Average length; exact for fixed-size units.
    #[must_use]
    pub fn approx_millis(self) -> f64 {
        match self {
            Self::Millisecond => 1.0,
            Self::Second => MS_PER_SECOND as f64,
            Self::Minute => MS_PER_MINUTE as f64,
            Self::Hour => MS_PER_HOUR as f64,
            Self::Day => MS_PER_DAY as f64,
            Self::Week => 7.0 * MS_PER_DAY as f64,
            Self::Month => AVG_MONTH_MS,
            Self::Year => AVG_YEAR_MS,
            Self::Decade => 10.0 * AVG_YEAR_MS,
            Self::Century => 100.0 * AVG_YEAR_MS,
            Self::Millennium => 1_000.0 * AVG_YEAR_MS,
        }
    }

    fn fixed_millis(self) -> Option<i64> {
        match self {
            Self::Millisecond => Some(1),
            Self::Second => Some(MS_PER_SECOND),
            Self::Minute => Some(MS_PER_MINUTE),
            Self::Hour => Some(MS_PER_HOUR),
            Self::Day => Some(MS_PER_DAY),
            _ => None,
        }
    }

    fn years(self) -> Option<i64> {
        match self {
            Self::Year => Some(1),
            Self::Decade => Some(10),
            Self::Century => Some(100),
            Self::Millennium => Some(1_000),
            _ => None,
        }
    }

    fn multiples(self) -> &'static [i64] {
        match self {
            Self::Millisecond => &[1, 2, 5, 10, 20, 50, 100, 200, 500],
            Self::Second | Self::Minute => &[1, 2, 5, 10, 15, 30],
            Self::Hour => &[1, 2, 3, 6, 12],
            Self::Day | Self::Week => &[1, 2],
            Self::Month => &[1, 2, 3, 6],
            Self::Year | Self::Decade | Self::Century => &[1, 2, 5],
            Self::Millennium => &[1, 2, 5],
        }
    }

    /// Next coarser unit whose boundaries mark major ticks.
    #[must_use]
    pub fn major_unit(self) -> Option<TimeUnit> {
        match self {
            Self::Millisecond => Some(Self::Second),
            Self::Second => Some(Self::Minute),
            Self::Minute => Some(Self::Hour),
            Self::Hour => Some(Self::Day),
            Self::Day => Some(Self::Month),
            Self::Week => None,
            Self::Month => Some(Self::Year),
            Self::Year => Some(Self::Decade),
            Self::Decade => Some(Self::Century),
            Self::Century => Some(Self::Millennium),
            Self::Millennium => None,
        }
    }
}

/// Tick cadence: `multiple` units per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStep {
    pub unit: TimeUnit,
    pub multiple: i64,
}

impl TickStep {
    pub fn new(unit: TimeUnit, multiple: i64) -> TimelineResult<Self> {
        if multiple <= 0 {
            return Err(TimelineError::InvalidData(
                "tick step multiple must be > 0".to_owned(),
            ));
        }
        Ok(Self { unit, multiple })
    }

    #[must_use]
    pub fn approx_millis(self) -> f64 {
        self.unit.approx_millis() * self.multiple as f64
    }

    /// Largest step boundary `<= time`.
    #[must_use]
    pub fn floor(self, time: TimePoint) -> TimePoint {
        if let Some(unit_ms) = self.unit.fixed_millis() {
            let step = unit_ms.saturating_mul(self.multiple);
            return TimePoint::from_millis(time.millis().div_euclid(step).saturating_mul(step));
        }

        let civil = time.civil();
        let floored = match self.unit {
            TimeUnit::Week => {
                // 1970-01-01 was a Thursday; weeks start on Monday.
                let days = time.days_since_epoch() + 3;
                let week_days = 7 * self.multiple;
                let start_day = days.div_euclid(week_days) * week_days - 3;
                return TimePoint::from_millis(start_day.saturating_mul(MS_PER_DAY));
            }
            TimeUnit::Month => {
                let month_index = civil.year * 12 + i64::from(civil.month) - 1;
                let floored = month_index.div_euclid(self.multiple) * self.multiple;
                TimePoint::from_ymd(
                    floored.div_euclid(12),
                    (floored.rem_euclid(12) + 1) as u32,
                    1,
                )
            }
            _ => {
                let span = self.unit.years().unwrap_or(1).saturating_mul(self.multiple);
                TimePoint::from_year(civil.year.div_euclid(span) * span)
            }
        };
        floored.unwrap_or(time)
    }

    /// Boundary following a floored `time`; saturates at the representable range.
    #[must_use]
    pub fn next(self, time: TimePoint) -> TimePoint {
        if let Some(unit_ms) = self.unit.fixed_millis() {
            return time.saturating_add_millis(unit_ms.saturating_mul(self.multiple));
        }

        let civil = time.civil();
        let next = match self.unit {
            TimeUnit::Week => {
                return time.saturating_add_millis(7 * self.multiple * MS_PER_DAY);
            }
            TimeUnit::Month => {
                let month_index = civil.year * 12 + i64::from(civil.month) - 1 + self.multiple;
                TimePoint::from_ymd(
                    month_index.div_euclid(12),
                    (month_index.rem_euclid(12) + 1) as u32,
                    1,
                )
            }
            _ => {
                let span = self.unit.years().unwrap_or(1).saturating_mul(self.multiple);
                TimePoint::from_year(civil.year.saturating_add(span))
            }
        };
        next.unwrap_or(TimePoint::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    pub target_spacing_px: f64,
    pub min_spacing_px: f64,
    pub max_ticks: usize,
    #[serde(default)]
    pub forced_step: Option<TickStep>,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            target_spacing_px: 72.0,
            min_spacing_px: 56.0,
            max_ticks: 512,
            forced_step: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    pub time: TimePoint,
    pub x: f64,
    pub unit: TimeUnit,
    pub label: String,
    pub is_major: bool,
}

/// Finest step whose average on-screen spacing reaches `target_spacing_px`.
#[must_use]
pub fn select_tick_step(pixels_per_ms: f64, target_spacing_px: f64) -> TickStep {
    let fallback = TickStep {
        unit: TimeUnit::Millennium,
        multiple: 1,
    };
    if !pixels_per_ms.is_finite() || pixels_per_ms <= 0.0 || !target_spacing_px.is_finite() {
        return fallback;
    }

    for unit in TimeUnit::ALL {
        for &multiple in unit.multiples() {
            let step = TickStep { unit, multiple };
            if step.approx_millis() * pixels_per_ms >= target_spacing_px {
                return step;
            }
        }
    }

    // Deep-time scales: grow millennium multiples by decades.
    let mut multiple: i64 = 10;
    while multiple < 1_000_000_000 {
        let step = TickStep {
            unit: TimeUnit::Millennium,
            multiple,
        };
        if step.approx_millis() * pixels_per_ms >= target_spacing_px {
            return step;
        }
        multiple = multiple.saturating_mul(10);
    }
    TickStep {
        unit: TimeUnit::Millennium,
        multiple,
    }
}

/// Generates ticks for `[start_ms, end_ms]` using `mapper` for positions.
pub fn generate_ticks(
    mapper: &dyn TimeMapping,
    start_ms: f64,
    end_ms: f64,
    step: TickStep,
    config: TickConfig,
) -> TimelineResult<Vec<TickMark>> {
    if !start_ms.is_finite() || !end_ms.is_finite() {
        return Err(TimelineError::InvalidData(
            "tick range must be finite".to_owned(),
        ));
    }
    if step.multiple <= 0 {
        return Err(TimelineError::InvalidData(
            "tick step multiple must be > 0".to_owned(),
        ));
    }
    let (lo, hi) = if start_ms <= end_ms {
        (start_ms, end_ms)
    } else {
        (end_ms, start_ms)
    };
    let step = fit_step_to_range(step, hi - lo, config.max_ticks);
    let start = TimePoint::saturating_from_f64_millis(lo.ceil());
    let end = TimePoint::saturating_from_f64_millis(hi.floor());

    let mut ticks = Vec::new();
    let mut current = step.floor(start);
    if current < start {
        current = step.next(current);
    }
    while current <= end && ticks.len() < config.max_ticks {
        ticks.push(TickMark {
            time: current,
            x: mapper.time_to_pixel(current),
            unit: step.unit,
            label: format_tick_label(current, step.unit),
            is_major: is_major_boundary(current, step.unit),
        });
        let next = step.next(current);
        if next <= current {
            break;
        }
        current = next;
    }

    Ok(select_ticks_with_min_spacing(ticks, config.min_spacing_px))
}

/// Coarsens `step` until `max_ticks` ticks span the whole range.
fn fit_step_to_range(step: TickStep, span_ms: f64, max_ticks: usize) -> TickStep {
    if max_ticks == 0 || span_ms <= 0.0 {
        return step;
    }
    let gaps = max_ticks.saturating_sub(1).max(1) as f64;
    // Calendar units vary in length; leave headroom.
    let min_step_ms = span_ms / gaps * 1.1;
    if step.approx_millis() >= min_step_ms {
        return step;
    }
    let coarser = select_tick_step(1.0, min_step_ms);
    debug!(
        requested = ?step,
        selected = ?coarser,
        span_ms,
        max_ticks,
        "coarsened tick step to fit range"
    );
    coarser
}

/// Ticks for a viewport's visible range on the linear mapping.
pub fn generate_viewport_ticks(
    viewport: &Viewport,
    config: TickConfig,
) -> TimelineResult<Vec<TickMark>> {
    let step = config.forced_step.unwrap_or_else(|| {
        select_tick_step(viewport.pixels_per_ms(), config.target_spacing_px)
    });
    let (start, end) = viewport.visible_range();
    generate_ticks(&viewport.mapper(), start, end, step, config)
}

fn is_major_boundary(time: TimePoint, unit: TimeUnit) -> bool {
    unit.major_unit().is_some_and(|major| {
        TickStep {
            unit: major,
            multiple: 1,
        }
        .floor(time)
            == time
    })
}

/// Drops ticks closer than `min_spacing_px` to the previously kept one.
fn select_ticks_with_min_spacing(mut ticks: Vec<TickMark>, min_spacing_px: f64) -> Vec<TickMark> {
    ticks.sort_by(|left, right| left.x.total_cmp(&right.x));
    if ticks.len() <= 1 || !min_spacing_px.is_finite() || min_spacing_px <= 0.0 {
        return ticks;
    }

    let mut selected: Vec<TickMark> = Vec::with_capacity(ticks.len());
    for tick in ticks {
        match selected.last() {
            Some(last) if tick.x - last.x < min_spacing_px => {
                // Majors displace a crowding minor.
                if tick.is_major && !last.is_major {
                    selected.pop();
                    selected.push(tick);
                }
            }
            _ => selected.push(tick),
        }
    }
    selected
}

#[must_use]
pub fn format_year(year: i64) -> String {
    if year <= 0 {
        format!("{} BC", 1 - year)
    } else {
        year.to_string()
    }
}

#[must_use]
pub fn format_tick_label(time: TimePoint, unit: TimeUnit) -> String {
    let civil = time.civil();
    let month = MONTH_NAMES[(civil.month.clamp(1, 12) - 1) as usize];
    match unit {
        TimeUnit::Millisecond => format!(
            "{:02}:{:02}:{:02}.{:03}",
            civil.hour, civil.minute, civil.second, civil.millisecond
        ),
        TimeUnit::Second => format!("{:02}:{:02}:{:02}", civil.hour, civil.minute, civil.second),
        TimeUnit::Minute | TimeUnit::Hour => format!("{:02}:{:02}", civil.hour, civil.minute),
        TimeUnit::Day | TimeUnit::Week => format!("{month} {}", civil.day),
        TimeUnit::Month => format!("{month} {}", format_year(civil.year)),
        TimeUnit::Year | TimeUnit::Decade | TimeUnit::Century | TimeUnit::Millennium => {
            format_year(civil.year)
        }
    }
}
