use crate::extensions::PluginContext;

use super::{PluginEvent, TimelineEngine};

impl TimelineEngine {
    pub(super) fn plugin_context(&self) -> PluginContext {
        let primary_band = self.primary_band().map(str::to_owned);
        let primary = primary_band
            .as_deref()
            .and_then(|band_id| self.bands.get(band_id));
        PluginContext {
            primary_viewport: primary.map(|band| band.viewport),
            primary_mode: primary.map(|band| band.controller.mode()),
            primary_band,
            band_count: self.bands.len(),
            events_len: self.events.len(),
            hot_zones_len: self.hot_zones.len(),
            sync_idle: *self.sync.state() == crate::sync::SyncState::Idle,
        }
    }

    pub(super) fn emit_plugin_event(&mut self, event: PluginEvent) {
        if self.plugins.is_empty() {
            return;
        }
        let context = self.plugin_context();
        for plugin in &mut self.plugins {
            plugin.on_event(&event, &context);
        }
    }
}
