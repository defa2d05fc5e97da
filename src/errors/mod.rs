// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Error types for graph construction and output forwarding
//!
//! Every failure is fatal to the call that raised it; the core never retries
//! and never logs-and-continues. Callers decide how errors interact with
//! per-stage `allow_failure` policy.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for taskgraph operations
pub type TaskgraphResult<T> = Result<T, TaskgraphError>;

/// Main error type for taskgraph
#[derive(Error, Debug, Diagnostic)]
pub enum TaskgraphError {
    // ─────────────────────────────────────────────────────────────────────────
    // Build Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Unknown task '{name}'")]
    #[diagnostic(
        code(taskgraph::unknown_task),
        help("Check that '{name}' is defined in the tasks map")
    )]
    UnknownTask { name: String },

    #[error("Unknown pipeline '{name}'")]
    #[diagnostic(
        code(taskgraph::unknown_pipeline),
        help("Check that '{name}' is defined in the pipelines map")
    )]
    UnknownPipeline { name: String },

    #[error("Stage at position {position} has no name")]
    #[diagnostic(
        code(taskgraph::missing_stage_name),
        help("Give the stage an explicit name, or reference a task or pipeline to derive one from")
    )]
    MissingStageName { position: usize },

    #[error("Stage with name '{name}' already exists")]
    #[diagnostic(code(taskgraph::duplicate_stage_name))]
    DuplicateStageName { name: String },

    #[error("Dependency '{from}' -> '{to}' would create a cycle")]
    #[diagnostic(
        code(taskgraph::cycle_detected),
        help("Review the depends_on entries of these stages to remove the cycle")
    )]
    CycleDetected { from: String, to: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Query Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Stage '{name}' not found in pipeline")]
    #[diagnostic(code(taskgraph::unknown_stage))]
    UnknownStage { name: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Definition Loading Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{}': {error}", path.display())]
    #[diagnostic(code(taskgraph::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Unsupported definition file format: {}", path.display())]
    #[diagnostic(
        code(taskgraph::unsupported_format),
        help("Supported extensions: .yaml, .yml, .toml, .json")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("IO error: {message}")]
    #[diagnostic(code(taskgraph::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(taskgraph::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(taskgraph::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(taskgraph::toml_error))]
    Toml { message: String },
}

impl From<std::io::Error> for TaskgraphError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for TaskgraphError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for TaskgraphError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for TaskgraphError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}
