mod controller;
mod input;

pub use controller::{FrameOutcome, MomentumStep, PanZoomController};
pub use input::{
    CaptureError, FocusTarget, InputOutcome, Key, KeyInput, NoopPointerCapture, PinchInput,
    PointerButton, PointerCapture, PointerInput, PointerKind, WheelInput,
};

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Dragging,
    Momentum,
    ZoomAdjusting,
}

/// Tuning for inertial panning after a drag is released.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumConfig {
    pub enabled: bool,
    /// Per-frame velocity multiplier, saturated into `(0, 1)`.
    pub friction: f64,
    /// Release velocity (px/ms) required to start momentum.
    pub start_velocity_px_per_ms: f64,
    /// Momentum ends once `abs(velocity)` drops below this (px/ms).
    pub stop_velocity_px_per_ms: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            friction: 0.95,
            start_velocity_px_per_ms: 0.1,
            stop_velocity_px_per_ms: 0.01,
        }
    }
}

impl MomentumConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        if !self.friction.is_finite() {
            return Err(TimelineError::InvalidData(
                "momentum friction must be finite".to_owned(),
            ));
        }
        for (value, name) in [
            (self.start_velocity_px_per_ms, "start_velocity_px_per_ms"),
            (self.stop_velocity_px_per_ms, "stop_velocity_px_per_ms"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "momentum `{name}` must be finite and > 0"
                )));
            }
        }
        Ok(self)
    }

    #[must_use]
    pub fn effective_friction(self) -> f64 {
        self.friction.clamp(0.0001, 0.9999)
    }
}

/// Runtime momentum state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MomentumState {
    pub active: bool,
    pub velocity_px_per_ms: f64,
    pub handle: Option<FrameHandle>,
}

/// Identity of one momentum run; ticks carrying a stale handle are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanZoomConfig {
    pub momentum: MomentumConfig,
    /// Weight of the newest sample in the exponential velocity average.
    pub velocity_smoothing: f64,
    /// A release this long after the last move discards the tracked velocity.
    pub release_idle_ms: f64,
    /// Zoom factor per wheel event. Only the sign of `delta_y` matters, so
    /// line-mode and pixel-mode wheels zoom at the same pace.
    pub wheel_zoom_step: f64,
    pub keyboard_zoom_factor: f64,
    /// Fraction of the visible time range moved per arrow key press.
    pub keyboard_pan_fraction: f64,
    /// Wheel and pinch zoom keep the instant under the pointer fixed instead
    /// of the center time.
    pub zoom_to_pointer: bool,
}

impl Default for PanZoomConfig {
    fn default() -> Self {
        Self {
            momentum: MomentumConfig::default(),
            velocity_smoothing: 0.8,
            release_idle_ms: 100.0,
            wheel_zoom_step: 1.1,
            keyboard_zoom_factor: 1.2,
            keyboard_pan_fraction: 0.1,
            zoom_to_pointer: false,
        }
    }
}

impl PanZoomConfig {
    pub fn validate(self) -> TimelineResult<Self> {
        self.momentum.validate()?;
        if !self.velocity_smoothing.is_finite()
            || self.velocity_smoothing <= 0.0
            || self.velocity_smoothing > 1.0
        {
            return Err(TimelineError::InvalidData(
                "velocity smoothing must be in (0, 1]".to_owned(),
            ));
        }
        for (value, name) in [
            (self.release_idle_ms, "release_idle_ms"),
            (self.wheel_zoom_step, "wheel_zoom_step"),
            (self.keyboard_zoom_factor, "keyboard_zoom_factor"),
            (self.keyboard_pan_fraction, "keyboard_pan_fraction"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TimelineError::InvalidData(format!(
                    "interaction `{name}` must be finite and > 0"
                )));
            }
        }
        Ok(self)
    }
}
