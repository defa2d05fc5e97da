// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Pipeline graph
//!
//! This module owns the dependency graph: stages as nodes, mirrored
//! successor/predecessor edge tables, the recursive builder with per-edge
//! cycle detection, and output forwarding between completed stages and their
//! dependents.

mod graph;
mod output;
mod stage;

pub use graph::Pipeline;
pub use stage::{RunnableUnit, Stage};
