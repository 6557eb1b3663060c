//! Multi-band scroll synchronization.
//!
//! Each band carries a sync ratio. A pixel scroll of `delta` on band `S`
//! becomes `delta * ratio(B) / ratio(S)` on every other band `B`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{TimelineError, TimelineResult};

pub type BandScrollCallback = Box<dyn FnMut(f64)>;
pub type GlobalScrollCallback = Box<dyn FnMut(&str, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSyncConfig {
    pub band_id: String,
    #[serde(default = "default_sync_ratio")]
    pub sync_ratio: f64,
    #[serde(default)]
    pub is_master: bool,
}

fn default_sync_ratio() -> f64 {
    1.0
}

impl BandSyncConfig {
    #[must_use]
    pub fn new(band_id: impl Into<String>, sync_ratio: f64) -> Self {
        Self {
            band_id: band_id.into(),
            sync_ratio,
            is_master: false,
        }
    }

    #[must_use]
    pub fn master(mut self) -> Self {
        self.is_master = true;
        self
    }

    pub fn validate(self) -> TimelineResult<Self> {
        if self.band_id.is_empty() {
            return Err(TimelineError::InvalidData(
                "band id must not be empty".to_owned(),
            ));
        }
        validate_ratio(self.sync_ratio)?;
        Ok(self)
    }
}

fn validate_ratio(ratio: f64) -> TimelineResult<f64> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(TimelineError::InvalidData(format!(
            "sync ratio must be finite and > 0, got {ratio}"
        )));
    }
    Ok(ratio)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    Idle,
    /// A scroll from this band is being propagated.
    Propagating(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandDelta {
    pub band_id: String,
    pub delta_px: f64,
}

/// Deltas produced by one `notify_scroll`: the source first, then the other
/// bands in registration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncPropagation {
    pub source: String,
    pub deltas: SmallVec<[BandDelta; 4]>,
}

impl SyncPropagation {
    /// Deltas for bands other than the source.
    pub fn targets(&self) -> impl Iterator<Item = &BandDelta> {
        self.deltas.iter().skip(1)
    }

    #[must_use]
    pub fn delta_for(&self, band_id: &str) -> Option<f64> {
        self.deltas
            .iter()
            .find(|delta| delta.band_id == band_id)
            .map(|delta| delta.delta_px)
    }
}

struct SyncedBand {
    config: BandSyncConfig,
    on_scroll: Option<BandScrollCallback>,
}

/// Registry of synchronized bands plus the re-entrancy guard.
///
/// The guard stays in `Propagating` after a scroll until the host calls
/// [`BandSyncCoordinator::on_next_tick`]; repeated scrolls from the same
/// band inside that window are dropped.
pub struct BandSyncCoordinator {
    bands: IndexMap<String, SyncedBand>,
    global_on_scroll: Option<GlobalScrollCallback>,
    state: SyncState,
}

impl fmt::Debug for BandSyncCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BandSyncCoordinator")
            .field("bands", &self.bands.keys().collect::<Vec<_>>())
            .field("has_global_callback", &self.global_on_scroll.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl Default for BandSyncCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl BandSyncCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bands: IndexMap::new(),
            global_on_scroll: None,
            state: SyncState::Idle,
        }
    }

    pub fn register_band(&mut self, config: BandSyncConfig) -> TimelineResult<()> {
        self.register_band_with_callback(config, None)
    }

    pub fn register_band_with_callback(
        &mut self,
        config: BandSyncConfig,
        on_scroll: Option<BandScrollCallback>,
    ) -> TimelineResult<()> {
        let config = config.validate()?;
        if self.bands.contains_key(&config.band_id) {
            return Err(TimelineError::DuplicateBand(config.band_id));
        }
        debug!(
            band_id = %config.band_id,
            sync_ratio = config.sync_ratio,
            is_master = config.is_master,
            "registered sync band"
        );
        self.bands
            .insert(config.band_id.clone(), SyncedBand { config, on_scroll });
        Ok(())
    }

    /// Removes a band. Returns `true` when it was registered.
    pub fn unregister_band(&mut self, band_id: &str) -> bool {
        let removed = self.bands.shift_remove(band_id).is_some();
        if removed {
            debug!(band_id, "unregistered sync band");
            if self.state == SyncState::Propagating(band_id.to_owned()) {
                self.state = SyncState::Idle;
            }
        }
        removed
    }

    pub fn set_band_callback(
        &mut self,
        band_id: &str,
        on_scroll: Option<BandScrollCallback>,
    ) -> TimelineResult<()> {
        let band = self
            .bands
            .get_mut(band_id)
            .ok_or_else(|| TimelineError::UnknownBand(band_id.to_owned()))?;
        band.on_scroll = on_scroll;
        Ok(())
    }

    pub fn set_global_callback(&mut self, on_scroll: Option<GlobalScrollCallback>) {
        self.global_on_scroll = on_scroll;
    }

    pub fn set_sync_ratio(&mut self, band_id: &str, sync_ratio: f64) -> TimelineResult<()> {
        let sync_ratio = validate_ratio(sync_ratio)?;
        let band = self
            .bands
            .get_mut(band_id)
            .ok_or_else(|| TimelineError::UnknownBand(band_id.to_owned()))?;
        band.config.sync_ratio = sync_ratio;
        Ok(())
    }

    #[must_use]
    pub fn sync_ratio(&self, band_id: &str) -> Option<f64> {
        self.bands.get(band_id).map(|band| band.config.sync_ratio)
    }

    #[must_use]
    pub fn contains(&self, band_id: &str) -> bool {
        self.bands.contains_key(band_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn band_ids(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    /// First band flagged as master, falling back to the first registered.
    #[must_use]
    pub fn master_band(&self) -> Option<&str> {
        self.bands
            .values()
            .find(|band| band.config.is_master)
            .or_else(|| self.bands.values().next())
            .map(|band| band.config.band_id.as_str())
    }

    #[must_use]
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// `delta * ratio(target) / ratio(source)`, or 0 when either band is
    /// unknown.
    #[must_use]
    pub fn synced_delta(&self, source: &str, target: &str, delta_px: f64) -> f64 {
        match (self.sync_ratio(source), self.sync_ratio(target)) {
            (Some(source_ratio), Some(target_ratio)) => delta_px * target_ratio / source_ratio,
            _ => 0.0,
        }
    }

    /// Propagates a scroll of `delta_px` on `source` to every other band.
    ///
    /// Returns `None` for unknown sources, non-finite deltas, and scrolls
    /// from the band that is already propagating.
    pub fn notify_scroll(&mut self, source: &str, delta_px: f64) -> Option<SyncPropagation> {
        if !delta_px.is_finite() {
            return None;
        }
        let source_ratio = self.sync_ratio(source)?;
        if self.state == SyncState::Propagating(source.to_owned()) {
            trace!(source, delta_px, "dropped re-entrant scroll");
            return None;
        }
        self.state = SyncState::Propagating(source.to_owned());

        let mut deltas = SmallVec::<[BandDelta; 4]>::new();
        deltas.push(BandDelta {
            band_id: source.to_owned(),
            delta_px,
        });

        for (band_id, band) in &mut self.bands {
            if band_id == source {
                continue;
            }
            let synced = delta_px * band.config.sync_ratio / source_ratio;
            if let Some(on_scroll) = band.on_scroll.as_mut() {
                on_scroll(synced);
            }
            if let Some(global) = self.global_on_scroll.as_mut() {
                global(band_id, synced);
            }
            deltas.push(BandDelta {
                band_id: band_id.clone(),
                delta_px: synced,
            });
        }
        if let Some(global) = self.global_on_scroll.as_mut() {
            global(source, delta_px);
        }

        trace!(source, delta_px, targets = deltas.len() - 1, "propagated scroll");
        Some(SyncPropagation {
            source: source.to_owned(),
            deltas,
        })
    }

    /// Clears the re-entrancy guard.
    pub fn on_next_tick(&mut self) {
        self.state = SyncState::Idle;
    }
}
