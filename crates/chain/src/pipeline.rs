// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline builder: `.step()` appends to the step list and registers the
//! task by name; `.register()` finalizes and installs the chain definition
//! into the owning registry.

use std::sync::Arc;

use oj_core::{ChainDefinition, ChainStep, PipelineName, QueueName};

use crate::error::ChainError;
use crate::registry::Registry;
use crate::task::Task;

pub struct PipelineBuilder<'r> {
    registry: &'r Registry,
    name: PipelineName,
    steps: Vec<ChainStep>,
}

impl<'r> PipelineBuilder<'r> {
    pub(crate) fn new(registry: &'r Registry, name: impl Into<PipelineName>) -> Self {
        Self {
            registry,
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step and register its task into the task registry.
    pub fn step(self, task: Arc<dyn Task>, queue: impl Into<QueueName>) -> Self {
        let step = ChainStep::new(task.name().clone(), queue.into());
        self.registry.register_task(task);
        let mut steps = self.steps;
        steps.push(step);
        Self { steps, ..self }
    }

    /// Validate and install the finished chain definition.
    pub fn register(self) -> Result<ChainDefinition, ChainError> {
        let chain = ChainDefinition::new(self.name, self.steps);
        chain.validate()?;
        self.registry.register_pipeline(chain.clone())?;
        Ok(chain)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
