//! Observer hooks for host-side extensions.
//!
//! Plugins see engine notifications and a read-only context; they never
//! mutate engine internals.

pub mod plugins;

pub use plugins::{PluginContext, PluginEvent, TimelinePlugin};
