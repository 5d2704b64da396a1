// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A registry keyed by plugin name. The coordinator holds one instance,
//! built once at startup from [`crate::reference_registry`].

use std::collections::BTreeMap;

use crate::contract::{Plugin, PluginInfo};

/// Owns the set of plugins known to this coordinator, keyed by name.
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self { plugins: BTreeMap::new() }
    }

    /// Register `plugin`, keyed by its declared name. A later registration
    /// under the same name replaces the earlier one.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name();
        self.plugins.insert(name, plugin);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(AsRef::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// All registered plugins' display metadata, for the introspection
    /// endpoint (spec §6 "list plugins").
    pub fn list_info(&self) -> Vec<PluginInfo> {
        self.plugins.values().map(|p| p.info()).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
