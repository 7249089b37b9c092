// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry-bookkeeping middleware: republishes a failed task after a jittered
//! exponential delay, up to a configured attempt ceiling.

use std::sync::Arc;

use async_trait::async_trait;
use oj_broker::{BackoffConfig, BrokerAdapter, TaskEnvelope, LABEL_ATTEMPT};
use tracing::{error, warn};

use crate::error::MiddlewareError;
use crate::middleware::Middleware;
use crate::result::{StepResult, RETRY_SCHEDULED};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff: BackoffConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffConfig::default(),
        }
    }
}

pub struct RetryMiddleware {
    config: RetryConfig,
    broker: Arc<BrokerAdapter>,
}

impl RetryMiddleware {
    pub fn new(broker: Arc<BrokerAdapter>, config: RetryConfig) -> Self {
        Self { broker, config }
    }

    fn current_attempt(envelope: &TaskEnvelope) -> u32 {
        envelope
            .labels
            .get(LABEL_ATTEMPT)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }
}

/// Whether a failed step should be rescheduled: it must have a real error
/// (not already a scheduled retry, not a success) and still have budget left.
fn should_retry(result: &StepResult, attempt: u32, max_attempts: u32) -> bool {
    match &result.error {
        None => false,
        Some(error) if error == RETRY_SCHEDULED => false,
        Some(_) => attempt < max_attempts,
    }
}

#[async_trait]
impl Middleware for RetryMiddleware {
    async fn post_execute(
        &self,
        queue: &str,
        envelope: &TaskEnvelope,
        result: &mut StepResult,
    ) -> Result<(), MiddlewareError> {
        let attempt = Self::current_attempt(envelope);
        if !should_retry(result, attempt, self.config.max_attempts) {
            return Ok(());
        }

        let delay = self.config.backoff.delay_for_attempt(attempt);
        let mut next_labels = envelope.labels.clone();
        next_labels.insert(LABEL_ATTEMPT.to_string(), (attempt + 1).to_string());

        let broker = self.broker.clone();
        let queue = queue.to_string();
        let task_name = envelope.task_name.clone();
        let body = envelope.args.first().cloned().unwrap_or(serde_json::Value::Null);

        warn!(
            task_name = %task_name,
            attempt,
            ?delay,
            "scheduling retry"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = broker.publish(&queue, &task_name, body, next_labels).await {
                error!(error = %err, task_name, "retry republish failed");
            }
        });

        result.error = Some(RETRY_SCHEDULED.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
