// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task registry's entries: a named, callable unit of work bound to a
//! queue by a [`crate::pipeline::PipelineBuilder`] step.

use async_trait::async_trait;
use oj_core::{PipelineMessage, TaskName};

/// A terminal task failure, as fed to the middleware's post-execute chain.
#[derive(Debug, Clone)]
pub struct TaskError {
    pub message: String,
    pub kind: String,
}

impl TaskError {
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
        }
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TaskError {}

/// A unit of work bound to a queue within a pipeline. Implementors are
/// registered into the task registry by name so a worker consuming a queue
/// can look up which task to run for an incoming envelope.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &TaskName;

    async fn run(&self, message: PipelineMessage) -> Result<serde_json::Value, TaskError>;
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
