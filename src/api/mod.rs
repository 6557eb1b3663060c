mod band;
mod band_controller;
mod data_controller;
mod engine;
mod engine_config;
mod engine_snapshot;
mod interaction_controller;
mod json_contract;
mod layout_controller;
mod plugin_dispatch;
mod plugin_registry;

pub use band::BandLayout;
pub use engine::TimelineEngine;
pub use engine_config::{BandConfig, TimelineEngineConfig};
pub use engine_snapshot::{BandSnapshot, EngineSnapshot};
pub use json_contract::{ENGINE_SNAPSHOT_JSON_SCHEMA_V1, EngineSnapshotJsonContractV1};

pub use crate::extensions::PluginEvent;
