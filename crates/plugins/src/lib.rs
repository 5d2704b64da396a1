// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! renderq-plugins: the rendering-plugin contract (spec §4.6), a registry of
//! named plugins, and two reference implementations.
//!
//! Plugins are a closed interface — every operation is always present on
//! the trait, with default no-op bodies for the optional hooks, rather than
//! discovered by reflection (spec §9 re-architecture note: "the coordinator
//! never reflects on a plugin").

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod contract;
mod error;
mod frame_chunk;
mod registry;
mod sequence_encode;

pub use contract::{JobDescriptor, ParameterKind, ParameterSpec, Plugin, PluginInfo};
pub use error::PluginError;
pub use frame_chunk::FrameChunkPlugin;
pub use registry::PluginRegistry;
pub use sequence_encode::SequenceEncodePlugin;

/// Build the registry wired up for this repository's two reference plugins.
/// Coordinator startup calls this once and shares the result.
pub fn reference_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Box::new(FrameChunkPlugin::new()));
    registry.register(Box::new(SequenceEncodePlugin::new()));
    registry
}
