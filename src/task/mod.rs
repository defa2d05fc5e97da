// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Task handles
//!
//! A [`Task`] is the runtime counterpart of a
//! [`TaskDefinition`](crate::definitions::TaskDefinition): the leaf executable
//! unit a stage wraps. Execution happens outside this crate; the executor
//! writes the captured output into [`OutputLog`] when the task completes, and
//! only then do dependents read it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::definitions::TaskDefinition;

/// A leaf executable unit referenced by a stage
#[derive(Debug, Clone)]
pub struct Task {
    /// Task name
    pub name: String,

    /// Command and arguments
    pub command: Vec<String>,

    /// Execution context reference
    pub context: Option<String>,

    /// Task-scoped environment
    pub env: HashMap<String, String>,

    /// Working directory; stage `dir` overrides land here
    pub dir: Option<PathBuf>,

    /// Execution timeout, interpreted by the executor
    pub timeout: Option<Duration>,

    /// Treat a non-zero exit as success
    pub allow_failure: bool,

    /// Override name for output forwarding
    pub export_as: Option<String>,

    /// Captured output, valid once the executor marks the task complete
    pub log: OutputLog,
}

impl Task {
    /// Build a runtime task from its definition. The key under which the
    /// definition was registered wins over an absent inline name.
    pub fn from_definition(key: &str, def: &TaskDefinition) -> Self {
        Self {
            name: def.name.clone().unwrap_or_else(|| key.to_string()),
            command: def.command.clone(),
            context: def.context.clone(),
            env: def.env.clone(),
            dir: def.dir.clone(),
            timeout: def.timeout_ms.map(Duration::from_millis),
            allow_failure: def.allow_failure,
            export_as: def.export_as.clone(),
            log: OutputLog::default(),
        }
    }
}

/// Captured output of a completed task
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    stdout: String,
}

impl OutputLog {
    /// Append captured stdout text (executor side)
    pub fn append_stdout(&mut self, text: &str) {
        self.stdout.push_str(text);
    }

    /// Read the captured stdout text
    pub fn stdout(&self) -> &str {
        &self.stdout
    }
}
