// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! # taskgraph - Pipeline Dependency Graph Core
//!
//! `taskgraph` turns declarative stage definitions into a validated, acyclic
//! dependency graph of executable stages.
//!
//! ## Features
//!
//! - **Recursive pipelines** - A stage wraps a task or a whole nested pipeline
//! - **Cycle detection** - Circular dependencies are rejected as edges are added
//! - **Name resolution** - Stage names derive from task/pipeline references
//! - **Output forwarding** - A finished stage's stdout flows to its dependents
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use taskgraph::DefinitionSet;
//!
//! let defs = DefinitionSet::from_file(std::path::Path::new("tasks.yaml"))?;
//! let mut pipeline = defs.build_pipeline("release")?;
//!
//! // A scheduler walks from()/to() to order execution, then before running
//! // each stage:
//! pipeline.provide_output("deploy")?;
//! ```
//!
//! The crate only builds and describes the graph; executing stages, enforcing
//! timeouts and interpreting `allow_failure` are the scheduler's job.

pub mod definitions;
pub mod errors;
pub mod pipeline;
pub mod task;
pub mod variables;

// Re-export commonly used types
pub use definitions::{DefinitionSet, StageDefinition, TaskDefinition};
pub use errors::{TaskgraphError, TaskgraphResult};
pub use pipeline::{Pipeline, RunnableUnit, Stage};
pub use task::Task;
pub use variables::Variables;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
