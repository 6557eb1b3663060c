use tracing::{debug, trace};

use crate::core::{
    HotZone, ParseReport, RawEvent, RawHotZone, TimelineEvent, parse_events, parse_hot_zones,
};
use crate::error::TimelineResult;

use super::{PluginEvent, TimelineEngine};

impl TimelineEngine {
    /// Replaces the event collection.
    pub fn set_events(&mut self, events: Vec<TimelineEvent>) {
        debug!(count = events.len(), "set timeline events");
        self.events = events;
        self.events_version += 1;
        self.emit_plugin_event(PluginEvent::DataUpdated {
            events_len: self.events.len(),
            skipped: 0,
        });
    }

    /// Parses and replaces the event collection, skipping unparsable items.
    pub fn set_raw_events(&mut self, raw: &[RawEvent]) -> ParseReport {
        let (events, report) = parse_events(raw);
        self.events = events;
        self.events_version += 1;
        self.emit_plugin_event(PluginEvent::DataUpdated {
            events_len: self.events.len(),
            skipped: report.skipped.len(),
        });
        report
    }

    /// Appends one event. Returns its index.
    pub fn add_event(&mut self, event: TimelineEvent) -> usize {
        self.events.push(event);
        self.events_version += 1;
        trace!(count = self.events.len(), "appended timeline event");
        self.emit_plugin_event(PluginEvent::DataUpdated {
            events_len: self.events.len(),
            skipped: 0,
        });
        self.events.len() - 1
    }

    pub fn clear_events(&mut self) {
        self.set_events(Vec::new());
    }

    /// Registers a hot zone. Returns its index.
    pub fn add_hot_zone(&mut self, zone: HotZone) -> TimelineResult<usize> {
        let index = self.hot_zones.add_zone(zone)?;
        self.hot_zones_changed();
        Ok(index)
    }

    pub fn remove_hot_zone(&mut self, index: usize) -> TimelineResult<HotZone> {
        let zone = self.hot_zones.remove_zone(index)?;
        self.hot_zones_changed();
        Ok(zone)
    }

    /// Replaces all hot zones; rejected as a whole if any zone is invalid.
    pub fn set_hot_zones(&mut self, zones: Vec<HotZone>) -> TimelineResult<()> {
        self.hot_zones.set_zones(zones)?;
        self.hot_zones_changed();
        Ok(())
    }

    /// Parses and replaces hot zones, skipping unparsable items.
    pub fn set_raw_hot_zones(&mut self, raw: &[RawHotZone]) -> TimelineResult<ParseReport> {
        let (zones, report) = parse_hot_zones(raw);
        self.set_hot_zones(zones)?;
        debug!(
            accepted = report.accepted,
            skipped = report.skipped.len(),
            "replaced hot zones from raw input"
        );
        Ok(report)
    }

    pub fn clear_hot_zones(&mut self) {
        self.hot_zones.clear();
        self.hot_zones_changed();
    }

    fn hot_zones_changed(&mut self) {
        self.zones_version += 1;
        self.emit_plugin_event(PluginEvent::HotZonesUpdated {
            zones_len: self.hot_zones.len(),
        });
    }
}
