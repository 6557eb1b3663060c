pub mod date_parse;
pub mod event;
pub mod hot_zone;
pub mod primitives;
pub mod scale;
pub mod ticks;
pub mod types;
pub mod windowing;

pub use date_parse::parse_time_point;
pub use event::{ParseReport, RawEvent, SkippedItem, TimelineEvent, parse_events};
pub use hot_zone::{
    HotZone, HotZoneResolver, MagnificationSegment, RawHotZone, ZoneResolution, parse_hot_zones,
};
pub use primitives::{
    CivilDateTime, MAX_ABS_YEAR, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, TimePoint,
};
pub use scale::{LinearTimeMapper, SegmentedTimeMapper, TimeMapping, to_pixel, to_time};
pub use ticks::{
    TickConfig, TickMark, TickStep, TimeUnit, format_tick_label, format_year, generate_ticks,
    generate_viewport_ticks, select_tick_step,
};
pub use types::{Viewport, ZoomLimits};
pub use windowing::{
    BufferSize, VirtualizationConfig, VirtualizationStats, VirtualizedEvents,
    events_in_time_window, virtualize_events,
};
