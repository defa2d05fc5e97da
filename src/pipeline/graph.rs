// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Pipeline graph storage and construction
//!
//! A [`Pipeline`] owns its stages plus two mirrored edge tables keyed by
//! stage name: `from` maps a stage to the stages depending on it, `to` maps a
//! stage to its dependencies. Both tables preserve insertion order. The
//! builder validates name uniqueness and acyclicity as it goes; once `build`
//! returns `Ok`, the structure never changes again and is safe for shared
//! concurrent reads.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::definitions::{StageDefinition, TaskDefinition};
use crate::errors::{TaskgraphError, TaskgraphResult};
use crate::pipeline::{RunnableUnit, Stage};
use crate::task::Task;
use crate::variables::Variables;

/// An acyclic dependency graph of stages
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Pipeline-scoped environment, appended to by external consumers
    pub env: HashMap<String, Vec<String>>,

    nodes: HashMap<String, Stage>,
    from: HashMap<String, Vec<String>>,
    to: HashMap<String, Vec<String>>,
}

impl Pipeline {
    /// Build a pipeline from stage definitions and the named lookup maps.
    ///
    /// Definitions are processed in input order. Pipeline references recurse
    /// into this same builder; any error aborts the whole build and no
    /// partial graph is returned.
    pub fn build(
        stage_defs: &[StageDefinition],
        pipelines: &HashMap<String, Vec<StageDefinition>>,
        tasks: &HashMap<String, TaskDefinition>,
    ) -> TaskgraphResult<Self> {
        let mut pipeline = Self::default();

        for (position, def) in stage_defs.iter().enumerate() {
            let mut unit = None;

            if let Some(task_ref) = def.task.as_deref().filter(|t| !t.is_empty()) {
                let task_def =
                    tasks
                        .get(task_ref)
                        .ok_or_else(|| TaskgraphError::UnknownTask {
                            name: task_ref.to_string(),
                        })?;

                unit = Some(RunnableUnit::Task(Task::from_definition(task_ref, task_def)));
            } else if let Some(pipeline_ref) = def.pipeline.as_deref().filter(|p| !p.is_empty()) {
                let nested_defs =
                    pipelines
                        .get(pipeline_ref)
                        .ok_or_else(|| TaskgraphError::UnknownPipeline {
                            name: pipeline_ref.to_string(),
                        })?;

                let nested = Self::build(nested_defs, pipelines, tasks)?;
                unit = Some(RunnableUnit::Pipeline(Box::new(nested)));
            }

            // The dir override lands on the wrapped task; meaningless otherwise
            if let (Some(dir), Some(RunnableUnit::Task(task))) = (&def.dir, &mut unit) {
                task.dir = Some(dir.clone());
            }

            // Explicit name, else the task key, else the pipeline key
            let name = def
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| def.task.clone().filter(|n| !n.is_empty()))
                .or_else(|| def.pipeline.clone().filter(|n| !n.is_empty()))
                .ok_or(TaskgraphError::MissingStageName { position })?;

            if pipeline.nodes.contains_key(&name) {
                return Err(TaskgraphError::DuplicateStageName { name });
            }

            let stage = Stage {
                name: name.clone(),
                condition: def.condition.clone(),
                unit,
                depends_on: def.depends_on.clone(),
                env: def.env.clone(),
                dir: def.dir.clone(),
                allow_failure: def.allow_failure,
                variables: Variables::from_map(&def.variables),
            };

            debug!(stage = %name, dependencies = def.depends_on.len(), "registered stage");
            pipeline.add_node(stage);

            for dep in &def.depends_on {
                pipeline.add_edge(dep, &name)?;
            }
        }

        Ok(pipeline)
    }

    fn add_node(&mut self, stage: Stage) {
        self.nodes.insert(stage.name.clone(), stage);
    }

    /// Record the mirrored edge pair `from -> to`, then reject it if it
    /// closes a cycle. The tables are keyed by name, so `from` may reference
    /// a stage defined later in the input (or never); bookkeeping proceeds
    /// regardless of registration order.
    fn add_edge(&mut self, from: &str, to: &str) -> TaskgraphResult<()> {
        self.from
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.to
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());

        if self.edge_creates_cycle(from, to) {
            return Err(TaskgraphError::CycleDetected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        trace!(%from, %to, "added dependency edge");
        Ok(())
    }

    /// A freshly inserted edge `from -> to` closes a cycle iff `from` is
    /// already reachable from `to` over the successor table. Any cycle
    /// containing the new edge is caught here, at the edge completing it, so
    /// the graph never survives construction with one. The visited set is
    /// scoped to this single call; converging acyclic paths do not trip it.
    fn edge_creates_cycle(&self, from: &str, to: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack = vec![to];

        while let Some(node) = stack.pop() {
            if node == from {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(successors) = self.from.get(node) {
                stack.extend(successors.iter().map(String::as_str));
            }
        }

        false
    }

    /// The full node table
    pub fn nodes(&self) -> &HashMap<String, Stage> {
        &self.nodes
    }

    /// Look up a stage by name
    pub fn node(&self, name: &str) -> TaskgraphResult<&Stage> {
        self.nodes
            .get(name)
            .ok_or_else(|| TaskgraphError::UnknownStage {
                name: name.to_string(),
            })
    }

    /// Mutable lookup, for executors writing task output or stage state
    pub fn node_mut(&mut self, name: &str) -> TaskgraphResult<&mut Stage> {
        self.nodes
            .get_mut(name)
            .ok_or_else(|| TaskgraphError::UnknownStage {
                name: name.to_string(),
            })
    }

    /// Names of stages depending on `name`, in edge-insertion order
    pub fn from(&self, name: &str) -> &[String] {
        self.from.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of stages `name` depends on, in edge-insertion order
    pub fn to(&self, name: &str) -> &[String] {
        self.to.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Generate a DOT rendering of the dependency graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        // Edges (nodes are implicit)
        for (from, successors) in &self.from {
            for to in successors {
                out.push_str(&format!("    \"{}\" -> \"{}\";\n", from, to));
            }
        }

        // Isolated nodes (no edges)
        for name in self.nodes.keys() {
            if self.from(name).is_empty() && self.to(name).is_empty() {
                out.push_str(&format!("    \"{}\";\n", name));
            }
        }

        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: Option<&str>, task: Option<&str>, deps: &[&str]) -> StageDefinition {
        StageDefinition {
            name: name.map(String::from),
            task: task.map(String::from),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    fn tasks(names: &[&str]) -> HashMap<String, TaskDefinition> {
        names
            .iter()
            .map(|n| (n.to_string(), TaskDefinition::default()))
            .collect()
    }

    fn no_pipelines() -> HashMap<String, Vec<StageDefinition>> {
        HashMap::new()
    }

    #[test]
    fn test_mirrored_edges() {
        let defs = vec![
            stage(Some("A"), None, &[]),
            stage(Some("B"), None, &["A"]),
            stage(Some("C"), None, &["B", "A"]),
        ];

        let p = Pipeline::build(&defs, &no_pipelines(), &tasks(&[])).unwrap();

        assert_eq!(p.from("A"), ["B", "C"]);
        assert_eq!(p.from("B"), ["C"]);
        assert_eq!(p.to("C"), ["B", "A"]);
        assert_eq!(p.to("B"), ["A"]);
        assert!(p.to("A").is_empty());
        assert!(p.from("C").is_empty());

        // Every from[a] entry b is mirrored by a in to[b]
        for (a, succs) in &p.from {
            for b in succs {
                assert!(p.to(b).contains(a), "edge {} -> {} not mirrored", a, b);
            }
        }
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        let defs = vec![stage(Some("A"), None, &["B"]), stage(Some("B"), None, &["A"])];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&[]));
        assert!(matches!(result, Err(TaskgraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let defs = vec![stage(Some("A"), None, &["A"])];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&[]));
        assert!(matches!(result, Err(TaskgraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_three_node_cycle_rejected_with_forward_references() {
        // Deps point at stages defined later; the cycle still closes at
        // the last inserted edge
        let defs = vec![
            stage(Some("A"), None, &["C"]),
            stage(Some("B"), None, &["A"]),
            stage(Some("C"), None, &["B"]),
        ];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&[]));
        assert!(matches!(result, Err(TaskgraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_forward_referenced_diamond_builds() {
        // Acyclic diamond whose edges are all forward references; a naive
        // revisit-anywhere DFS reports a false cycle here
        let defs = vec![
            stage(Some("x"), None, &["s"]),
            stage(Some("y"), None, &["s"]),
            stage(Some("z"), None, &["x", "y"]),
            stage(Some("s"), None, &["w"]),
            stage(Some("w"), None, &[]),
        ];

        let p = Pipeline::build(&defs, &no_pipelines(), &tasks(&[])).unwrap();
        assert_eq!(p.from("s"), ["x", "y"]);
        assert_eq!(p.to("z"), ["x", "y"]);
    }

    #[test]
    fn test_duplicate_stage_name_rejected() {
        let defs = vec![stage(Some("build"), None, &[]), stage(Some("build"), None, &[])];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&[]));
        assert!(matches!(
            result,
            Err(TaskgraphError::DuplicateStageName { name }) if name == "build"
        ));
    }

    #[test]
    fn test_missing_stage_name_rejected() {
        let defs = vec![stage(None, None, &[])];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&[]));
        assert!(matches!(
            result,
            Err(TaskgraphError::MissingStageName { position: 0 })
        ));
    }

    #[test]
    fn test_name_derived_from_task() {
        let defs = vec![stage(None, Some("lint"), &[])];

        let p = Pipeline::build(&defs, &no_pipelines(), &tasks(&["lint"])).unwrap();
        let node = p.node("lint").unwrap();
        assert_eq!(node.name, "lint");
        assert_eq!(node.task().unwrap().name, "lint");
    }

    #[test]
    fn test_name_derived_from_pipeline() {
        let pipelines = HashMap::from([("release".to_string(), vec![stage(Some("a"), None, &[])])]);
        let defs = vec![StageDefinition {
            pipeline: Some("release".into()),
            ..Default::default()
        }];

        let p = Pipeline::build(&defs, &pipelines, &tasks(&[])).unwrap();
        assert!(p.node("release").is_ok());
    }

    #[test]
    fn test_unknown_task_rejected() {
        let defs = vec![stage(None, Some("ghost"), &[])];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&["lint"]));
        assert!(matches!(
            result,
            Err(TaskgraphError::UnknownTask { name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_unknown_pipeline_rejected() {
        let defs = vec![StageDefinition {
            pipeline: Some("ghost".into()),
            ..Default::default()
        }];

        let result = Pipeline::build(&defs, &no_pipelines(), &tasks(&[]));
        assert!(matches!(
            result,
            Err(TaskgraphError::UnknownPipeline { name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_nested_pipeline_builds_recursively() {
        let pipelines = HashMap::from([(
            "release".to_string(),
            vec![
                stage(Some("package"), Some("build"), &[]),
                stage(Some("publish"), Some("build"), &["package"]),
            ],
        )]);
        let defs = vec![
            stage(Some("ci"), Some("build"), &[]),
            StageDefinition {
                pipeline: Some("release".into()),
                depends_on: vec!["ci".into()],
                ..Default::default()
            },
        ];

        let p = Pipeline::build(&defs, &pipelines, &tasks(&["build"])).unwrap();

        let nested = p.node("release").unwrap().pipeline().unwrap();
        assert_eq!(nested.from("package"), ["publish"]);
        assert_eq!(nested.to("publish"), ["package"]);
        assert_eq!(p.to("release"), ["ci"]);
    }

    #[test]
    fn test_nested_cycle_fails_outer_build() {
        let pipelines = HashMap::from([(
            "broken".to_string(),
            vec![
                stage(Some("a"), None, &["b"]),
                stage(Some("b"), None, &["a"]),
            ],
        )]);
        let defs = vec![StageDefinition {
            pipeline: Some("broken".into()),
            ..Default::default()
        }];

        let result = Pipeline::build(&defs, &pipelines, &tasks(&[]));
        assert!(matches!(result, Err(TaskgraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_dir_override_lands_on_task() {
        let defs = vec![StageDefinition {
            task: Some("build".into()),
            dir: Some("subdir".into()),
            ..Default::default()
        }];

        let p = Pipeline::build(&defs, &no_pipelines(), &tasks(&["build"])).unwrap();
        let task = p.node("build").unwrap().task().unwrap();
        assert_eq!(task.dir.as_deref(), Some(std::path::Path::new("subdir")));
    }

    #[test]
    fn test_node_lookup_unknown_stage() {
        let p = Pipeline::build(&[], &no_pipelines(), &tasks(&[])).unwrap();
        assert!(matches!(
            p.node("ghost"),
            Err(TaskgraphError::UnknownStage { name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_to_dot_output() {
        let defs = vec![
            stage(Some("a"), None, &[]),
            stage(Some("b"), None, &["a"]),
            stage(Some("lonely"), None, &[]),
        ];

        let p = Pipeline::build(&defs, &no_pipelines(), &tasks(&[])).unwrap();
        let dot = p.to_dot();

        assert!(dot.starts_with("digraph pipeline {"));
        assert!(dot.contains("\"a\" -> \"b\";"));
        assert!(dot.contains("\"lonely\";"));
    }
}
