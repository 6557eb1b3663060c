use tracing::{debug, trace};

use crate::core::Viewport;
use crate::error::TimelineResult;

use super::input::{
    FocusTarget, InputOutcome, Key, KeyInput, PinchInput, PointerCapture, PointerInput,
    WheelInput,
};
use super::{FrameHandle, InteractionMode, MomentumState, PanZoomConfig};

/// Result of one momentum step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumStep {
    /// Content shift applied to the viewport, in pixels.
    pub pan_px: f64,
    /// Momentum dropped below the stop threshold during this step.
    pub finished: bool,
}

/// Everything one animation frame did to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutcome {
    pub pan_px: f64,
    pub momentum_ended: bool,
    pub zoom_settled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    pointer_id: i32,
    last_x: f64,
    last_timestamp_ms: f64,
}

/// Per-band gesture state machine.
///
/// `Idle -> Dragging -> Momentum -> Idle` for pointer drags and
/// `Idle -> ZoomAdjusting -> Idle` for wheel, keyboard and pinch zoom. The
/// controller never owns the viewport; every handler receives it mutably and
/// reads the current config on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct PanZoomController {
    config: PanZoomConfig,
    mode: InteractionMode,
    drag: Option<DragState>,
    velocity_px_per_ms: f64,
    momentum: MomentumState,
    next_handle: u64,
    pinch_distance_px: Option<f64>,
}

impl Default for PanZoomController {
    fn default() -> Self {
        Self {
            config: PanZoomConfig::default(),
            mode: InteractionMode::Idle,
            drag: None,
            velocity_px_per_ms: 0.0,
            momentum: MomentumState::default(),
            next_handle: 0,
            pinch_distance_px: None,
        }
    }
}

impl PanZoomController {
    pub fn new(config: PanZoomConfig) -> TimelineResult<Self> {
        Ok(Self {
            config: config.validate()?,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn config(&self) -> PanZoomConfig {
        self.config
    }

    pub fn set_config(&mut self, config: PanZoomConfig) -> TimelineResult<()> {
        self.config = config.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn momentum_state(&self) -> MomentumState {
        self.momentum
    }

    /// Smoothed drag velocity in px/ms.
    #[must_use]
    pub fn velocity_px_per_ms(&self) -> f64 {
        self.velocity_px_per_ms
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.mode == InteractionMode::Dragging
    }

    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
    ) -> InputOutcome {
        if !input.x.is_finite() || !input.timestamp_ms.is_finite() || !input.starts_drag() {
            return InputOutcome::ignored();
        }
        if self.drag.is_some() {
            return InputOutcome::ignored();
        }

        self.cancel_momentum();
        if let Err(err) = capture.set_pointer_capture(input.pointer_id) {
            debug!(error = %err, pointer_id = input.pointer_id, "pointer capture unavailable");
        }

        self.drag = Some(DragState {
            pointer_id: input.pointer_id,
            last_x: input.x,
            last_timestamp_ms: input.timestamp_ms,
        });
        self.velocity_px_per_ms = 0.0;
        self.pinch_distance_px = None;
        self.mode = InteractionMode::Dragging;
        debug!(pointer_id = input.pointer_id, x = input.x, "drag started");

        InputOutcome {
            prevent_default: true,
            ..InputOutcome::handled()
        }
    }

    pub fn pointer_move(&mut self, viewport: &mut Viewport, input: PointerInput) -> InputOutcome {
        if !input.x.is_finite() || !input.timestamp_ms.is_finite() {
            return InputOutcome::ignored();
        }
        let Some(drag) = self.drag.as_mut() else {
            return InputOutcome::ignored();
        };
        if drag.pointer_id != input.pointer_id {
            return InputOutcome::ignored();
        }

        let delta_px = input.x - drag.last_x;
        let delta_t = input.timestamp_ms - drag.last_timestamp_ms;
        drag.last_x = input.x;
        drag.last_timestamp_ms = input.timestamp_ms;

        if delta_t > 0.0 {
            let sample = delta_px / delta_t;
            let alpha = self.config.velocity_smoothing;
            self.velocity_px_per_ms = alpha * sample + (1.0 - alpha) * self.velocity_px_per_ms;
        }

        viewport.pan_by_pixels(delta_px);
        trace!(
            delta_px,
            velocity = self.velocity_px_per_ms,
            "drag moved"
        );

        InputOutcome {
            prevent_default: true,
            pan_px: delta_px,
            ..InputOutcome::handled()
        }
    }

    /// Ends the drag and starts momentum when the release is fast enough.
    pub fn pointer_up(
        &mut self,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
    ) -> InputOutcome {
        self.release(input, capture, "up")
    }

    /// Ends the drag like [`Self::pointer_up`]; a fast cancelled drag still
    /// coasts.
    pub fn pointer_cancel(
        &mut self,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
    ) -> InputOutcome {
        self.release(input, capture, "cancel")
    }

    fn release(
        &mut self,
        input: PointerInput,
        capture: &mut dyn PointerCapture,
        reason: &'static str,
    ) -> InputOutcome {
        let Some(drag) = self.drag else {
            return InputOutcome::ignored();
        };
        if drag.pointer_id != input.pointer_id {
            return InputOutcome::ignored();
        }

        self.end_drag(drag.pointer_id, capture);
        if input.timestamp_ms.is_finite()
            && input.timestamp_ms - drag.last_timestamp_ms > self.config.release_idle_ms
        {
            self.velocity_px_per_ms = 0.0;
        }

        let velocity = self.velocity_px_per_ms;
        let momentum_started = self.config.momentum.enabled
            && velocity.abs() > self.config.momentum.start_velocity_px_per_ms
            && self.start_momentum(velocity).is_some();
        debug!(
            pointer_id = drag.pointer_id,
            reason,
            velocity,
            momentum_started,
            "drag ended"
        );

        InputOutcome {
            momentum_started,
            ..InputOutcome::handled()
        }
    }

    fn end_drag(&mut self, pointer_id: i32, capture: &mut dyn PointerCapture) {
        if let Err(err) = capture.release_pointer_capture(pointer_id) {
            debug!(error = %err, pointer_id, "pointer release failed");
        }
        self.drag = None;
        self.mode = InteractionMode::Idle;
    }

    /// Starts a momentum run at `velocity_px_per_ms`, invalidating any
    /// previous run. Returns the handle that owns the new run.
    pub fn start_momentum(&mut self, velocity_px_per_ms: f64) -> Option<FrameHandle> {
        if !velocity_px_per_ms.is_finite() || velocity_px_per_ms == 0.0 || self.drag.is_some() {
            return None;
        }
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = FrameHandle(self.next_handle);
        self.momentum = MomentumState {
            active: true,
            velocity_px_per_ms,
            handle: Some(handle),
        };
        self.mode = InteractionMode::Momentum;
        debug!(velocity_px_per_ms, handle = handle.0, "momentum started");
        Some(handle)
    }

    /// Stops any momentum run. Returns `true` when one was active.
    pub fn cancel_momentum(&mut self) -> bool {
        if !self.momentum.active {
            return false;
        }
        self.momentum = MomentumState::default();
        if self.mode == InteractionMode::Momentum {
            self.mode = InteractionMode::Idle;
        }
        debug!("momentum cancelled");
        true
    }

    /// Advances the momentum run owned by `handle` by one frame.
    ///
    /// Returns `None` when momentum is inactive or `handle` is stale.
    pub fn step_momentum(
        &mut self,
        viewport: &mut Viewport,
        handle: FrameHandle,
        frame_ms: f64,
    ) -> Option<MomentumStep> {
        if !self.momentum.active || self.momentum.handle != Some(handle) {
            return None;
        }
        if !frame_ms.is_finite() || frame_ms <= 0.0 {
            return None;
        }

        let friction = self.config.momentum.effective_friction();
        self.momentum.velocity_px_per_ms *= friction;
        let pan_px = self.momentum.velocity_px_per_ms * frame_ms;
        viewport.pan_by_pixels(pan_px);
        trace!(
            pan_px,
            velocity = self.momentum.velocity_px_per_ms,
            "momentum step"
        );

        let finished = self.momentum.velocity_px_per_ms.abs()
            < self.config.momentum.stop_velocity_px_per_ms;
        if finished {
            self.momentum = MomentumState::default();
            self.mode = InteractionMode::Idle;
            debug!("momentum finished");
        }
        Some(MomentumStep { pan_px, finished })
    }

    /// Host animation tick: steps momentum and settles a finished zoom.
    pub fn on_animation_frame(&mut self, viewport: &mut Viewport, frame_ms: f64) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        if let Some(handle) = self.momentum.handle {
            if let Some(step) = self.step_momentum(viewport, handle, frame_ms) {
                outcome.pan_px = step.pan_px;
                outcome.momentum_ended = step.finished;
            }
        }
        if self.mode == InteractionMode::ZoomAdjusting && self.pinch_distance_px.is_none() {
            self.mode = InteractionMode::Idle;
            outcome.zoom_settled = true;
        }
        outcome
    }

    pub fn wheel(&mut self, viewport: &mut Viewport, input: WheelInput) -> InputOutcome {
        let mut outcome = InputOutcome {
            prevent_default: true,
            ..InputOutcome::ignored()
        };
        if !input.delta_y.is_finite() || input.delta_y == 0.0 {
            return outcome;
        }

        let step = self.config.wheel_zoom_step;
        let factor = if input.delta_y < 0.0 { step } else { 1.0 / step };
        outcome.handled = true;
        outcome.zoom_changed = self.apply_zoom(viewport, factor, Some(input.x));
        outcome
    }

    pub fn key(&mut self, viewport: &mut Viewport, input: KeyInput) -> InputOutcome {
        let is_primary = match input.focus {
            FocusTarget::Band { is_primary } => is_primary,
            FocusTarget::FormField | FocusTarget::Other => return InputOutcome::ignored(),
        };

        match input.key {
            Key::Char('+') | Key::Char('=') => {
                let factor = self.config.keyboard_zoom_factor;
                self.key_zoom(viewport, factor)
            }
            Key::Char('-') | Key::Char('_') => {
                let factor = 1.0 / self.config.keyboard_zoom_factor;
                self.key_zoom(viewport, factor)
            }
            Key::ArrowLeft if is_primary => self.key_pan(viewport, -1.0),
            Key::ArrowRight if is_primary => self.key_pan(viewport, 1.0),
            _ => InputOutcome::ignored(),
        }
    }

    fn key_zoom(&mut self, viewport: &mut Viewport, factor: f64) -> InputOutcome {
        let zoom_changed = self.apply_zoom(viewport, factor, None);
        InputOutcome {
            prevent_default: true,
            zoom_changed,
            ..InputOutcome::handled()
        }
    }

    /// Moves the view by a fraction of the visible range; `direction > 0`
    /// moves forward in time.
    fn key_pan(&mut self, viewport: &mut Viewport, direction: f64) -> InputOutcome {
        self.cancel_momentum();
        let delta_ms = direction * viewport.visible_span_ms() * self.config.keyboard_pan_fraction;
        let pan_px = if viewport.pan_by_time(delta_ms) {
            -delta_ms * viewport.pixels_per_ms()
        } else {
            0.0
        };
        InputOutcome {
            prevent_default: true,
            pan_px,
            ..InputOutcome::handled()
        }
    }

    pub fn pinch_start(&mut self, input: PinchInput) -> InputOutcome {
        if !input.distance_px.is_finite() || input.distance_px <= 0.0 || self.drag.is_some() {
            return InputOutcome::ignored();
        }
        self.cancel_momentum();
        self.pinch_distance_px = Some(input.distance_px);
        self.mode = InteractionMode::ZoomAdjusting;
        debug!(distance_px = input.distance_px, "pinch started");
        InputOutcome {
            prevent_default: true,
            ..InputOutcome::handled()
        }
    }

    /// Zooms by the ratio of the current to the previous finger distance.
    pub fn pinch_move(&mut self, viewport: &mut Viewport, input: PinchInput) -> InputOutcome {
        let Some(previous) = self.pinch_distance_px else {
            return InputOutcome::ignored();
        };
        if !input.distance_px.is_finite() || input.distance_px <= 0.0 {
            return InputOutcome::ignored();
        }

        let ratio = input.distance_px / previous;
        self.pinch_distance_px = Some(input.distance_px);
        let zoom_changed = self.apply_zoom(viewport, ratio, Some(input.center_x));
        InputOutcome {
            prevent_default: true,
            zoom_changed,
            ..InputOutcome::handled()
        }
    }

    pub fn pinch_end(&mut self) -> InputOutcome {
        if self.pinch_distance_px.take().is_none() {
            return InputOutcome::ignored();
        }
        if self.mode == InteractionMode::ZoomAdjusting {
            self.mode = InteractionMode::Idle;
        }
        debug!("pinch ended");
        InputOutcome::handled()
    }

    fn apply_zoom(&mut self, viewport: &mut Viewport, factor: f64, anchor_px: Option<f64>) -> bool {
        self.cancel_momentum();
        let changed = match anchor_px {
            Some(anchor_px) if self.config.zoom_to_pointer => {
                viewport.zoom_by_around(factor, anchor_px)
            }
            _ => viewport.zoom_by(factor),
        };
        if self.drag.is_none() {
            self.mode = InteractionMode::ZoomAdjusting;
        }
        if changed {
            trace!(factor, zoom_level = viewport.zoom_level(), "zoom applied");
        }
        changed
    }
}
