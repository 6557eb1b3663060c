use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    None,
}

/// Pointer sample in band-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub pointer_id: i32,
    pub kind: PointerKind,
    pub button: PointerButton,
    pub x: f64,
    pub timestamp_ms: f64,
    /// Pointer is over a nested interactive element (button, link, popup).
    pub over_interactive: bool,
}

impl PointerInput {
    #[must_use]
    pub fn mouse(x: f64, timestamp_ms: f64) -> Self {
        Self {
            pointer_id: 1,
            kind: PointerKind::Mouse,
            button: PointerButton::Primary,
            x,
            timestamp_ms,
            over_interactive: false,
        }
    }

    #[must_use]
    pub fn touch(pointer_id: i32, x: f64, timestamp_ms: f64) -> Self {
        Self {
            pointer_id,
            kind: PointerKind::Touch,
            button: PointerButton::Primary,
            x,
            timestamp_ms,
            over_interactive: false,
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn over_interactive(mut self) -> Self {
        self.over_interactive = true;
        self
    }

    pub(crate) fn starts_drag(&self) -> bool {
        !self.over_interactive
            && (self.kind == PointerKind::Touch || self.button == PointerButton::Primary)
    }
}

/// Wheel sample; negative `delta_y` zooms in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub delta_y: f64,
    pub x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other,
}

/// Element holding keyboard focus when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusTarget {
    Band { is_primary: bool },
    FormField,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    pub focus: FocusTarget,
}

/// Two-finger gesture sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchInput {
    pub distance_px: f64,
    pub center_x: f64,
}

/// What a handler did, so the host can forward `prevent_default` and the
/// engine can propagate pans to synchronized bands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputOutcome {
    pub handled: bool,
    pub prevent_default: bool,
    /// Content shift applied to the viewport, in pixels.
    pub pan_px: f64,
    pub zoom_changed: bool,
    pub momentum_started: bool,
}

impl InputOutcome {
    pub(crate) fn ignored() -> Self {
        Self::default()
    }

    pub(crate) fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pointer capture failed: {0}")]
pub struct CaptureError(pub String);

/// Host hook for pointer capture. Failures are tolerated by the controller.
pub trait PointerCapture {
    fn set_pointer_capture(&mut self, pointer_id: i32) -> Result<(), CaptureError>;
    fn release_pointer_capture(&mut self, pointer_id: i32) -> Result<(), CaptureError>;
}

/// Capture hook for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPointerCapture;

impl PointerCapture for NoopPointerCapture {
    fn set_pointer_capture(&mut self, _pointer_id: i32) -> Result<(), CaptureError> {
        Ok(())
    }

    fn release_pointer_capture(&mut self, _pointer_id: i32) -> Result<(), CaptureError> {
        Ok(())
    }
}
