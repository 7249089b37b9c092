// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes for the AMQP body: the task envelope and the DLQ envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Labels = BTreeMap<String, String>;

/// Well-known label keys the middleware pipeline reads and writes. Additional
/// string labels are passed through unchanged.
pub const LABEL_PIPELINE_ID: &str = "pipeline_id";
pub const LABEL_STEP_INDEX: &str = "step_index";
pub const LABEL_CHAIN: &str = "chain";
pub const LABEL_ROUTING_KEY: &str = "routing_key";
pub const LABEL_ATTEMPT: &str = "attempt";

/// UTF-8 JSON body carried by every task message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub labels: Labels,
    pub task_id: String,
    pub task_name: String,
}

impl TaskEnvelope {
    pub fn new(task_name: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            labels: Labels::new(),
            task_id: task_id.into(),
            task_name: task_name.into(),
        }
    }

    pub fn with_arg(mut self, value: serde_json::Value) -> Self {
        self.args.push(value);
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// Durable publish body for the dead-letter queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DlqEnvelope {
    pub task_name: String,
    pub task_id: String,
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, serde_json::Value>,
    pub labels: Labels,
    pub error: String,
    pub error_type: String,
}

/// When the adapter acknowledges a consumed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckPolicy {
    WhenReceived,
    WhenExecuted,
    WhenSaved,
}

impl Default for AckPolicy {
    fn default() -> Self {
        AckPolicy::WhenExecuted
    }
}

/// Extract the routing key from a queue name: the substring after the last `.`.
pub fn routing_key_for_queue(queue: &str) -> &str {
    queue.rsplit('.').next().unwrap_or(queue)
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
