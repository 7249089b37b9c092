// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dead-letter middleware: publishes a terminally-failed task to the single
//! shared DLQ and never re-raises. Runs after the retry middleware in the
//! fixed post-execute order, so a result already marked [`RETRY_SCHEDULED`]
//! is left alone here.

use std::sync::Arc;

use async_trait::async_trait;
use oj_broker::{BrokerAdapter, DlqEnvelope, TaskEnvelope};
use tracing::warn;

use crate::error::MiddlewareError;
use crate::middleware::Middleware;
use crate::result::{StepResult, RETRY_SCHEDULED};

pub struct DlqMiddleware {
    broker: Arc<BrokerAdapter>,
    /// The one dead-letter queue every source queue publishes to, e.g.
    /// `clarinet.dead_letter` — not a per-source-queue derivation.
    dlq_queue: String,
}

impl DlqMiddleware {
    pub fn new(broker: Arc<BrokerAdapter>, dlq_queue: impl Into<String>) -> Self {
        Self {
            broker,
            dlq_queue: dlq_queue.into(),
        }
    }
}

/// A result is dead-letter-worthy once it carries a real, terminal error —
/// not a success, and not one the retry middleware already rescheduled.
fn should_dlq(result: &StepResult) -> bool {
    match &result.error {
        None => false,
        Some(error) => error != RETRY_SCHEDULED,
    }
}

#[async_trait]
impl Middleware for DlqMiddleware {
    async fn post_execute(
        &self,
        _queue: &str,
        envelope: &TaskEnvelope,
        result: &mut StepResult,
    ) -> Result<(), MiddlewareError> {
        if !should_dlq(result) {
            return Ok(());
        }
        let Some(error) = result.error.clone() else {
            return Ok(());
        };

        let record = DlqEnvelope {
            task_name: envelope.task_name.clone(),
            task_id: envelope.task_id.clone(),
            args: envelope.args.clone(),
            kwargs: envelope.kwargs.clone(),
            labels: envelope.labels.clone(),
            error,
            error_type: result.error_kind.clone().unwrap_or_else(|| "Unknown".to_string()),
        };

        warn!(
            queue = %self.dlq_queue,
            task_name = %envelope.task_name,
            task_id = %envelope.task_id,
            "dead-lettering exhausted task"
        );
        self.broker.publish_dlq(&self.dlq_queue, record).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "dlq_tests.rs"]
mod tests;
