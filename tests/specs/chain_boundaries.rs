// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boundary behaviors around chain construction and the chain-protocol
//! decode step, none of which need a broker to exercise.

use std::sync::Arc;

use async_trait::async_trait;
use oj_chain::{ChainError, Registry, Task, TaskError};
use oj_core::{decode_step_result, ChainDefError, PipelineMessage, TaskName};

struct NoopTask {
    name: TaskName,
}

#[async_trait]
impl Task for NoopTask {
    fn name(&self) -> &TaskName {
        &self.name
    }

    async fn run(&self, message: PipelineMessage) -> Result<serde_json::Value, TaskError> {
        Ok(serde_json::to_value(message).unwrap())
    }
}

fn task(name: &str) -> Arc<dyn Task> {
    Arc::new(NoopTask { name: TaskName::new(name) })
}

#[test]
fn a_pipeline_with_no_steps_is_rejected_before_touching_the_registry() {
    let registry = Registry::new();
    let result = registry.pipeline("empty").register();

    assert!(matches!(result, Err(ChainError::Invalid(ChainDefError::Empty(_)))));
    // Nothing was installed: a later lookup of the same name still misses.
    assert!(registry.get("empty").is_none());
}

#[test]
fn registering_the_same_pipeline_name_twice_is_rejected() {
    let registry = Registry::new();
    registry.pipeline("p1").step(task("t1"), "clarinet.default").register().unwrap();

    let result = registry.pipeline("p1").step(task("t2"), "clarinet.default").register();
    assert!(matches!(result, Err(ChainError::DuplicatePipeline(_))));

    // The first registration is untouched by the failed second attempt.
    assert_eq!(registry.get("p1").unwrap().steps.len(), 1);
}

#[test]
fn decode_step_result_accepts_a_well_formed_pipeline_message() {
    let message = PipelineMessage::new("patient-1", "study-1");
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(decode_step_result(&value).unwrap(), message);
}

#[test]
fn decode_step_result_rejects_a_value_with_the_wrong_shape() {
    let value = serde_json::json!({"not_a_message": true});
    assert!(decode_step_result(&value).is_err());
}

#[test]
fn decode_step_result_rejects_a_bare_scalar() {
    let value = serde_json::json!("just a string");
    assert!(decode_step_result(&value).is_err());
}
