// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ordered step list serialized into a chain label, and its durable mirror.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PipelineName, QueueName, TaskName};

/// One `(task_name, queue)` pair within a [`ChainDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub task_name: TaskName,
    pub queue: QueueName,
}

impl ChainStep {
    pub fn new(task_name: impl Into<TaskName>, queue: impl Into<QueueName>) -> Self {
        Self {
            task_name: task_name.into(),
            queue: queue.into(),
        }
    }
}

/// The ordered step list serialized into a task's `chain` label.
///
/// Built in memory by the chain builder, serialized at dispatch time into the
/// initiating task's labels, and re-read/re-serialized on each hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub pipeline_name: PipelineName,
    pub steps: Vec<ChainStep>,
}

/// Raised when a [`ChainDefinition`] fails its structural invariant: non-empty steps.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainDefError {
    #[error("pipeline {0:?} has no steps")]
    Empty(PipelineName),
}

impl ChainDefinition {
    pub fn new(pipeline_name: impl Into<PipelineName>, steps: Vec<ChainStep>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            steps,
        }
    }

    /// Reject empty step lists, per the chain builder's non-empty invariant.
    pub fn validate(&self) -> Result<(), ChainDefError> {
        if self.steps.is_empty() {
            return Err(ChainDefError::Empty(self.pipeline_name.clone()));
        }
        Ok(())
    }

    pub fn step(&self, index: usize) -> Option<&ChainStep> {
        self.steps.get(index)
    }

    pub fn is_last_step(&self, index: usize) -> bool {
        index + 1 >= self.steps.len()
    }
}

/// Durable mirror of a [`ChainDefinition`] keyed by name, written by `sync` and
/// read by API collaborators that need to inspect chains. `steps` is stored as
/// an opaque sequence of string maps rather than a typed [`ChainStep`] list,
/// since the storage contract makes no claim about the step schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: PipelineName,
    pub steps: Vec<BTreeMap<String, String>>,
}

impl From<&ChainDefinition> for PipelineDefinition {
    fn from(chain: &ChainDefinition) -> Self {
        let steps = chain
            .steps
            .iter()
            .map(|step| {
                let mut map = BTreeMap::new();
                map.insert("task_name".to_string(), step.task_name.as_str().to_string());
                map.insert("queue".to_string(), step.queue.as_str().to_string());
                map
            })
            .collect();
        Self {
            name: chain.pipeline_name.clone(),
            steps,
        }
    }
}

impl TryFrom<&PipelineDefinition> for ChainDefinition {
    type Error = ChainDefError;

    fn try_from(def: &PipelineDefinition) -> Result<Self, Self::Error> {
        let steps = def
            .steps
            .iter()
            .filter_map(|map| {
                let task_name = map.get("task_name")?;
                let queue = map.get("queue")?;
                Some(ChainStep::new(task_name.as_str(), queue.as_str()))
            })
            .collect::<Vec<_>>();
        let chain = ChainDefinition {
            pipeline_name: def.name.clone(),
            steps,
        };
        chain.validate()?;
        Ok(chain)
    }
}

#[cfg(test)]
#[path = "chain_def_tests.rs"]
mod tests;
