use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{HotZone, Viewport};
use crate::error::TimelineResult;
use crate::interaction::{InteractionMode, MomentumState};
use crate::sync::SyncState;

use super::TimelineEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSnapshot {
    pub viewport: Viewport,
    pub visible_range: (f64, f64),
    pub mode: InteractionMode,
    pub momentum: MomentumState,
    pub sync_ratio: f64,
    pub is_master: bool,
}

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub bands: IndexMap<String, BandSnapshot>,
    pub events_len: usize,
    pub hot_zones: Vec<HotZone>,
    pub base_magnification: f64,
    pub sync_state: SyncState,
}

impl TimelineEngine {
    pub fn snapshot(&self) -> TimelineResult<EngineSnapshot> {
        let mut bands = IndexMap::with_capacity(self.bands.len());
        for (band_id, band) in &self.bands {
            bands.insert(
                band_id.clone(),
                BandSnapshot {
                    viewport: band.viewport,
                    visible_range: self.visible_range(band_id)?,
                    mode: band.controller.mode(),
                    momentum: band.controller.momentum_state(),
                    sync_ratio: band.config.sync_ratio,
                    is_master: band.config.is_master,
                },
            );
        }

        Ok(EngineSnapshot {
            bands,
            events_len: self.events.len(),
            hot_zones: self.hot_zones.zones().to_vec(),
            base_magnification: self.hot_zones.base_magnification(),
            sync_state: self.sync.state().clone(),
        })
    }
}
