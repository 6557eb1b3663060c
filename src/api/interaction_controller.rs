use tracing::trace;

use crate::error::TimelineResult;
use crate::interaction::{
    FocusTarget, InputOutcome, InteractionMode, KeyInput, PinchInput, PointerCapture,
    PointerInput, WheelInput,
};

use super::{PluginEvent, TimelineEngine};

impl TimelineEngine {
    pub fn pointer_down(
        &mut self,
        band_id: &str,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
    ) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        let had_momentum = band.controller.momentum_state().active;
        let outcome = band.controller.pointer_down(input, capture);
        if outcome.handled {
            if had_momentum {
                self.emit_plugin_event(PluginEvent::MomentumEnded {
                    band_id: band_id.to_owned(),
                });
            }
            self.emit_plugin_event(PluginEvent::PanStarted {
                band_id: band_id.to_owned(),
            });
        }
        Ok(outcome)
    }

    pub fn pointer_move(
        &mut self,
        band_id: &str,
        input: PointerInput,
    ) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        let outcome = band.controller.pointer_move(&mut band.viewport, input);
        self.after_input(band_id, outcome);
        Ok(outcome)
    }

    pub fn pointer_up(
        &mut self,
        band_id: &str,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
    ) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        let outcome = band.controller.pointer_up(input, capture);
        self.after_release(band_id, outcome);
        Ok(outcome)
    }

    pub fn pointer_cancel(
        &mut self,
        band_id: &str,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
    ) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        let outcome = band.controller.pointer_cancel(input, capture);
        self.after_release(band_id, outcome);
        Ok(outcome)
    }

    /// Wheel zoom. The outcome always asks the host to prevent the default
    /// page scroll.
    pub fn wheel(&mut self, band_id: &str, input: WheelInput) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        let outcome = band.controller.wheel(&mut band.viewport, input);
        self.after_input(band_id, outcome);
        Ok(outcome)
    }

    /// Keyboard input for `band_id`. Band focus is re-derived from the
    /// engine's primary band; arrow pan only applies there.
    pub fn key(&mut self, band_id: &str, mut input: KeyInput) -> TimelineResult<InputOutcome> {
        if let FocusTarget::Band { .. } = input.focus {
            input.focus = FocusTarget::Band {
                is_primary: self.primary_band() == Some(band_id),
            };
        }
        let band = self.band_mut(band_id)?;
        let outcome = band.controller.key(&mut band.viewport, input);
        self.after_input(band_id, outcome);
        Ok(outcome)
    }

    pub fn pinch_start(&mut self, band_id: &str, input: PinchInput) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        Ok(band.controller.pinch_start(input))
    }

    pub fn pinch_move(&mut self, band_id: &str, input: PinchInput) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        let outcome = band.controller.pinch_move(&mut band.viewport, input);
        self.after_input(band_id, outcome);
        Ok(outcome)
    }

    pub fn pinch_end(&mut self, band_id: &str) -> TimelineResult<InputOutcome> {
        let band = self.band_mut(band_id)?;
        Ok(band.controller.pinch_end())
    }

    /// Host animation tick.
    ///
    /// Clears the sync guard, steps momentum on every band and settles
    /// finished zoom gestures. Returns `true` while another frame is needed.
    pub fn on_animation_frame(&mut self, frame_ms: f64) -> bool {
        self.sync.on_next_tick();

        let band_ids: Vec<String> = self.bands.keys().cloned().collect();
        let mut needs_frame = false;
        for band_id in band_ids {
            let Some(band) = self.bands.get_mut(&band_id) else {
                continue;
            };
            let frame = band.controller.on_animation_frame(&mut band.viewport, frame_ms);
            let still_animating = band.controller.mode() == InteractionMode::Momentum;
            needs_frame |= still_animating;

            if frame.pan_px != 0.0 {
                trace!(band_id = %band_id, pan_px = frame.pan_px, "momentum frame");
                self.viewport_changed(&band_id);
                self.propagate_scroll(&band_id, frame.pan_px);
            }
            if frame.momentum_ended {
                self.emit_plugin_event(PluginEvent::MomentumEnded { band_id });
            }
        }
        needs_frame
    }

    /// Clears the sync re-entrancy guard.
    pub fn on_next_tick(&mut self) {
        self.sync.on_next_tick();
    }

    fn after_release(&mut self, band_id: &str, outcome: InputOutcome) {
        if outcome.handled {
            self.emit_plugin_event(PluginEvent::PanEnded {
                band_id: band_id.to_owned(),
            });
        }
        if outcome.momentum_started {
            let velocity_px_per_ms = self
                .bands
                .get(band_id)
                .map_or(0.0, |band| band.controller.momentum_state().velocity_px_per_ms);
            self.emit_plugin_event(PluginEvent::MomentumStarted {
                band_id: band_id.to_owned(),
                velocity_px_per_ms,
            });
        }
    }

    fn after_input(&mut self, band_id: &str, outcome: InputOutcome) {
        if outcome.zoom_changed {
            let zoom_level = self
                .bands
                .get(band_id)
                .map_or(1.0, |band| band.viewport.zoom_level());
            self.emit_plugin_event(PluginEvent::ZoomChanged {
                band_id: band_id.to_owned(),
                zoom_level,
            });
        }
        if outcome.zoom_changed || outcome.pan_px != 0.0 {
            self.viewport_changed(band_id);
        }
        if outcome.pan_px != 0.0 {
            self.propagate_scroll(band_id, outcome.pan_px);
        }
    }
}
