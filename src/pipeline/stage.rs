// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Stage nodes

use std::collections::HashMap;
use std::path::PathBuf;

use crate::pipeline::Pipeline;
use crate::task::Task;
use crate::variables::Variables;

/// What a stage executes: a single task, or a whole nested pipeline
#[derive(Debug, Clone)]
pub enum RunnableUnit {
    /// Leaf task
    Task(Task),

    /// Nested sub-pipeline, built recursively
    Pipeline(Box<Pipeline>),
}

/// A node in the pipeline graph
///
/// A stage with `unit: None` is a pure placement node: it carries no work of
/// its own but still participates in ordering via `depends_on`. Such a stage
/// must have an explicit name, since there is nothing to derive one from.
#[derive(Debug, Clone)]
pub struct Stage {
    /// Unique name within the owning pipeline
    pub name: String,

    /// Condition expression, evaluated by the executor
    pub condition: Option<String>,

    /// The task or nested pipeline this stage wraps, if any
    pub unit: Option<RunnableUnit>,

    /// Names of stages that must complete before this one
    pub depends_on: Vec<String>,

    /// Stage-scoped environment overrides
    pub env: HashMap<String, String>,

    /// Working-directory override, already pushed onto the wrapped task
    pub dir: Option<PathBuf>,

    /// Continue the pipeline even if this stage fails
    pub allow_failure: bool,

    /// Variable store, seeded from the definition and fed by output forwarding
    pub variables: Variables,
}

impl Stage {
    /// The wrapped task, if this stage is a task leaf
    pub fn task(&self) -> Option<&Task> {
        match &self.unit {
            Some(RunnableUnit::Task(t)) => Some(t),
            _ => None,
        }
    }

    /// Mutable access to the wrapped task
    pub fn task_mut(&mut self) -> Option<&mut Task> {
        match &mut self.unit {
            Some(RunnableUnit::Task(t)) => Some(t),
            _ => None,
        }
    }

    /// The nested pipeline, if this stage wraps one
    pub fn pipeline(&self) -> Option<&Pipeline> {
        match &self.unit {
            Some(RunnableUnit::Pipeline(p)) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to the nested pipeline
    pub fn pipeline_mut(&mut self) -> Option<&mut Pipeline> {
        match &mut self.unit {
            Some(RunnableUnit::Pipeline(p)) => Some(p),
            _ => None,
        }
    }

    /// Set a stage-scoped environment variable
    pub fn set_env_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.insert(name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TaskDefinition;

    fn bare_stage(name: &str) -> Stage {
        Stage {
            name: name.into(),
            condition: None,
            unit: None,
            depends_on: vec![],
            env: HashMap::new(),
            dir: None,
            allow_failure: false,
            variables: Variables::new(),
        }
    }

    #[test]
    fn test_unit_accessors() {
        let mut stage = bare_stage("group");
        assert!(stage.task().is_none());
        assert!(stage.pipeline().is_none());

        stage.unit = Some(RunnableUnit::Task(Task::from_definition(
            "lint",
            &TaskDefinition::default(),
        )));
        assert_eq!(stage.task().unwrap().name, "lint");
        assert!(stage.pipeline().is_none());
    }

    #[test]
    fn test_set_env_variable() {
        let mut stage = bare_stage("deploy");
        stage.set_env_variable("BUILD_OUTPUT", "ok");
        assert_eq!(stage.env.get("BUILD_OUTPUT").map(String::as_str), Some("ok"));
    }
}
