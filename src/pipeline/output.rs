// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 taskgraph contributors

//! Output forwarding
//!
//! Before a stage runs, each dependency's captured stdout is injected into
//! the stage's environment and variable store under deterministic names. The
//! scheduler must only call this once every dependency has completed and its
//! output is frozen.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::errors::TaskgraphResult;
use crate::pipeline::Pipeline;
use crate::task::Task;

fn env_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[^a-zA-Z0-9_]").unwrap())
}

impl Pipeline {
    /// Forward each dependency's captured stdout into the named stage.
    ///
    /// Dependencies wrapping a nested pipeline (or nothing) are skipped
    /// silently; only the target stage is mutated. An unknown stage name,
    /// either the target's or a dependency's, aborts the call.
    pub fn provide_output(&mut self, stage_name: &str) -> TaskgraphResult<()> {
        let deps = self.node(stage_name)?.depends_on.clone();

        let mut forwarded = Vec::with_capacity(deps.len());
        for dep in &deps {
            let node = self.node(dep)?;
            let Some(task) = node.task() else {
                continue;
            };

            let (var_name, env_name) = destination_names(dep, task);
            forwarded.push((var_name, env_name, task.log.stdout().to_string()));
        }

        let stage = self.node_mut(stage_name)?;
        for (var_name, env_name, stdout) in forwarded {
            debug!(stage = %stage_name, variable = %var_name, env = %env_name, "forwarding output");
            stage.set_env_variable(env_name, stdout.clone());
            stage.variables.set(var_name, stdout);
        }

        Ok(())
    }
}

/// Compute the (variable, environment) destination names for a dependency's
/// output. With `export_as` set, both are the override verbatim. Otherwise
/// the environment name is sanitised to `[A-Za-z0-9_]`; the variable name
/// deliberately is not.
fn destination_names(dep: &str, task: &Task) -> (String, String) {
    match task.export_as.as_deref().filter(|e| !e.is_empty()) {
        Some(export) => (export.to_string(), export.to_string()),
        None => {
            let var_name = format!("Output{}", title_case(dep));
            let env_name = env_name_pattern()
                .replace_all(&format!("{}_OUTPUT", dep.to_uppercase()), "_")
                .into_owned();
            (var_name, env_name)
        }
    }
}

/// Uppercase the first letter of every word, where a word begins after any
/// non-alphabetic character
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for ch in s.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !ch.is_alphabetic();
    }

    out
}
