// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging middleware: one record at send, one at post-execute.

use async_trait::async_trait;
use oj_broker::{TaskEnvelope, LABEL_PIPELINE_ID, LABEL_STEP_INDEX};
use tracing::{error, info};

use crate::error::MiddlewareError;
use crate::middleware::Middleware;
use crate::result::StepResult;

pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn pre_send(
        &self,
        queue: &str,
        envelope: &mut TaskEnvelope,
    ) -> Result<(), MiddlewareError> {
        let pipeline_id = envelope.labels.get(LABEL_PIPELINE_ID).map(String::as_str);
        let step_index = envelope.labels.get(LABEL_STEP_INDEX).map(String::as_str);
        info!(
            queue,
            task_name = %envelope.task_name,
            task_id = %envelope.task_id,
            pipeline_id,
            step_index,
            "sending task"
        );
        Ok(())
    }

    async fn post_execute(
        &self,
        queue: &str,
        envelope: &TaskEnvelope,
        result: &mut StepResult,
    ) -> Result<(), MiddlewareError> {
        let pipeline_id = envelope.labels.get(LABEL_PIPELINE_ID).map(String::as_str);
        let step_index = envelope.labels.get(LABEL_STEP_INDEX).map(String::as_str);
        let duration_ms = result.duration.as_millis() as u64;

        match &result.error {
            None => info!(
                queue,
                task_name = %envelope.task_name,
                task_id = %envelope.task_id,
                pipeline_id,
                step_index,
                duration_ms,
                "task completed"
            ),
            Some(err) => error!(
                queue,
                task_name = %envelope.task_name,
                task_id = %envelope.task_id,
                pipeline_id,
                step_index,
                duration_ms,
                error = %err,
                "task failed"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
