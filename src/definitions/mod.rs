// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Definition structures
//!
//! Defines the declarative schema consumed by the graph builder: stage and
//! task definitions plus the named maps that group them. The builder treats
//! everything here as read-only input.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{TaskgraphError, TaskgraphResult};
use crate::pipeline::Pipeline;

/// A single stage definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Stage name; when absent, derived from the task or pipeline reference
    #[serde(default)]
    pub name: Option<String>,

    /// Task to wrap, by key in the tasks map
    #[serde(default)]
    pub task: Option<String>,

    /// Sub-pipeline to wrap, by key in the pipelines map
    #[serde(default)]
    pub pipeline: Option<String>,

    /// Condition expression, evaluated by the executor
    #[serde(default)]
    pub condition: Option<String>,

    /// Names of stages that must complete before this one
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Stage-scoped environment overrides
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working-directory override for the wrapped task
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Continue the pipeline even if this stage fails
    #[serde(default)]
    pub allow_failure: bool,

    /// Initial contents of the stage's variable store
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// A single task definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Task name; defaults to the task's key in the tasks map
    #[serde(default)]
    pub name: Option<String>,

    /// Command and arguments to run
    #[serde(default)]
    pub command: Vec<String>,

    /// Execution context reference (shell, container, ssh...)
    #[serde(default)]
    pub context: Option<String>,

    /// Task-scoped environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Execution timeout in milliseconds, enforced by the executor
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Treat a non-zero exit as success
    #[serde(default)]
    pub allow_failure: bool,

    /// Override name under which the task's output is exported to dependents
    #[serde(default)]
    pub export_as: Option<String>,
}

/// Top-level definition file: named pipelines and tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionSet {
    /// Named stage lists, each buildable into a [`Pipeline`]
    #[serde(default)]
    pub pipelines: HashMap<String, Vec<StageDefinition>>,

    /// Named task definitions referenced by stages
    #[serde(default)]
    pub tasks: HashMap<String, TaskDefinition>,
}

impl DefinitionSet {
    /// Load definitions from a file, dispatching on extension
    pub fn from_file(path: &Path) -> TaskgraphResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TaskgraphError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(TaskgraphError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse definitions from a YAML string
    pub fn from_yaml(yaml: &str) -> TaskgraphResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Parse definitions from a TOML string
    pub fn from_toml(toml: &str) -> TaskgraphResult<Self> {
        toml::from_str(toml).map_err(Into::into)
    }

    /// Parse definitions from a JSON string
    pub fn from_json(json: &str) -> TaskgraphResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Serialize definitions to YAML
    pub fn to_yaml(&self) -> TaskgraphResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Build the named pipeline into a dependency graph
    pub fn build_pipeline(&self, name: &str) -> TaskgraphResult<Pipeline> {
        let stages = self
            .pipelines
            .get(name)
            .ok_or_else(|| TaskgraphError::UnknownPipeline {
                name: name.to_string(),
            })?;

        Pipeline::build(stages, &self.pipelines, &self.tasks)
    }

    /// Get all pipeline names
    pub fn pipeline_names(&self) -> Vec<&str> {
        self.pipelines.keys().map(String::as_str).collect()
    }
}
