use serde::{Deserialize, Serialize};

use crate::core::{SegmentedTimeMapper, TimeMapping, Viewport, VirtualizedEvents};
use crate::interaction::PanZoomController;
use crate::layout::TrackLayout;

use super::BandConfig;

/// Layout of one band for its current viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandLayout {
    pub band_id: String,
    /// Time range actually on screen under the band's mapping.
    pub visible_range: (f64, f64),
    pub virtualized: VirtualizedEvents,
    pub layout: TrackLayout,
}

/// Inputs a cached layout was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LayoutCacheKey {
    pub(super) viewport: [u64; 3],
    pub(super) events_version: u64,
    pub(super) zones_version: u64,
    pub(super) config_version: u64,
}

#[derive(Debug, Clone)]
pub(super) struct BandState {
    pub(super) config: BandConfig,
    pub(super) viewport: Viewport,
    pub(super) controller: PanZoomController,
    pub(super) cached_layout: Option<(LayoutCacheKey, BandLayout)>,
}

impl BandState {
    pub(super) fn visible_range_for(&self, mapper: &SegmentedTimeMapper) -> (f64, f64) {
        (
            mapper.pixel_to_ms(0.0),
            mapper.pixel_to_ms(self.viewport.pixel_width()),
        )
    }
}
