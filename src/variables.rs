// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Per-stage variable store
//!
//! Written by output forwarding, read by executors for substitution.

use std::collections::HashMap;

/// A string key→value store scoped to one stage
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded from a map
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            values: map.clone(),
        }
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Get a variable's value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Check whether a variable is set
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over all variables
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no variables are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
