//! timeline-rs: headless layout, coordinate and interaction engine for
//! multi-band chronological timelines.
//!
//! The crate maps time to pixels (with hot-zone magnification), stacks events
//! into non-overlapping tracks, culls events outside the viewport, drives
//! drag/momentum/zoom gestures and keeps several bands scrolling in step.
//! Rendering is left to the host.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod layout;
pub mod sync;
pub mod telemetry;

pub use api::{BandConfig, TimelineEngine, TimelineEngineConfig};
pub use error::{TimelineError, TimelineResult};
