// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chain-advancement middleware: on a successful step, decodes the chain
//! carried in the task's labels, advances the pipeline message to the next
//! step, and republishes to that step's queue. Runs last in the fixed
//! post-execute order, after retry and DLQ have had a chance to intercept a
//! failure.

use std::sync::Arc;

use async_trait::async_trait;
use oj_broker::{
    routing_key_for_queue, BrokerAdapter, Labels, TaskEnvelope, LABEL_CHAIN, LABEL_PIPELINE_ID,
    LABEL_ROUTING_KEY, LABEL_STEP_INDEX,
};
use oj_core::{decode_chain, decode_step_result, encode_chain};
use tracing::{debug, error, info};

use crate::error::MiddlewareError;
use crate::middleware::Middleware;
use crate::result::StepResult;

pub struct ChainMiddleware {
    broker: Arc<BrokerAdapter>,
}

impl ChainMiddleware {
    pub fn new(broker: Arc<BrokerAdapter>) -> Self {
        Self { broker }
    }
}

#[async_trait]
impl Middleware for ChainMiddleware {
    async fn post_execute(
        &self,
        queue: &str,
        envelope: &TaskEnvelope,
        result: &mut StepResult,
    ) -> Result<(), MiddlewareError> {
        let Some(chain_label) = envelope.labels.get(LABEL_CHAIN) else {
            return Ok(());
        };
        let chain = decode_chain(chain_label)
            .map_err(|err| MiddlewareError::ChainProtocol(err.to_string()))?;

        if result.error.is_some() {
            debug!(pipeline = %chain.pipeline_name, "step failed, chain advancement skipped");
            return Ok(());
        }

        let step_index: usize = envelope
            .labels
            .get(LABEL_STEP_INDEX)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);

        if chain.is_last_step(step_index) {
            info!(pipeline = %chain.pipeline_name, step_index, "chain complete");
            return Ok(());
        }

        let Some(return_value) = result.return_value.clone() else {
            return Ok(());
        };
        let message = match decode_step_result(&return_value) {
            Ok(message) => message,
            Err(err) => {
                error!(
                    pipeline = %chain.pipeline_name,
                    step_index,
                    error = %err,
                    "step output is not a valid pipeline message, dropping chain"
                );
                return Ok(());
            }
        };

        let next_index = step_index + 1;
        let Some(next_step) = chain.step(next_index) else {
            return Ok(());
        };
        let next_message = message.advance(chain.pipeline_name.clone(), next_index as u32);
        let chain_label = encode_chain(&chain).map_err(|err| MiddlewareError::ChainProtocol(err.to_string()))?;

        let mut labels = Labels::new();
        if let Some(pipeline_id) = envelope.labels.get(LABEL_PIPELINE_ID) {
            labels.insert(LABEL_PIPELINE_ID.to_string(), pipeline_id.clone());
        }
        labels.insert(LABEL_STEP_INDEX.to_string(), next_index.to_string());
        labels.insert(LABEL_CHAIN.to_string(), chain_label);
        labels.insert(
            LABEL_ROUTING_KEY.to_string(),
            routing_key_for_queue(next_step.queue.as_str()).to_string(),
        );

        let body = serde_json::to_value(&next_message)
            .map_err(|err| MiddlewareError::ChainProtocol(err.to_string()))?;

        self.broker
            .publish(next_step.queue.as_str(), next_step.task_name.as_str(), body, labels)
            .await?;

        debug!(
            pipeline = %chain.pipeline_name,
            next_step = next_index,
            queue = %next_step.queue,
            "advanced chain"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
