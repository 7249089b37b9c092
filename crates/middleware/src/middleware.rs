// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The middleware pipeline: pre-send and post-execute hooks invoked in a
//! fixed order at each stage. The order is structural — it is the order the
//! boxed trait objects were pushed into the `Vec` at construction — rather
//! than a runtime check.

use async_trait::async_trait;
use oj_broker::TaskEnvelope;

use crate::error::MiddlewareError;
use crate::result::StepResult;

/// One stage of the middleware pipeline. Both hooks default to a no-op so a
/// middleware that only cares about one stage (e.g. the DLQ middleware,
/// which is a no-op at publish time) need not implement the other.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn pre_send(
        &self,
        _queue: &str,
        _envelope: &mut TaskEnvelope,
    ) -> Result<(), MiddlewareError> {
        Ok(())
    }

    async fn post_execute(
        &self,
        _queue: &str,
        _envelope: &TaskEnvelope,
        _result: &mut StepResult,
    ) -> Result<(), MiddlewareError> {
        Ok(())
    }
}

/// An ordered stack of middlewares, run in construction order at both
/// publish time (pre-send) and consume time (post-execute).
pub struct MiddlewarePipeline {
    stages: Vec<Box<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new(stages: Vec<Box<dyn Middleware>>) -> Self {
        Self { stages }
    }

    pub async fn pre_send(
        &self,
        queue: &str,
        envelope: &mut TaskEnvelope,
    ) -> Result<(), MiddlewareError> {
        for stage in &self.stages {
            stage.pre_send(queue, envelope).await?;
        }
        Ok(())
    }

    pub async fn post_execute(
        &self,
        queue: &str,
        envelope: &TaskEnvelope,
        result: &mut StepResult,
    ) -> Result<(), MiddlewareError> {
        for stage in &self.stages {
            stage.post_execute(queue, envelope, result).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;
