// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step-by-step chain execution, driven directly through [`Task::run`] and
//! the chain-protocol decode/advance primitives rather than a live broker —
//! the same loop a worker runs around one message, made visible for
//! assertions. True end-to-end variants that exercise the broker and the
//! middleware pipeline are marked `#[ignore]` below.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use oj_chain::{Registry, Task, TaskError};
use oj_core::{decode_step_result, ChainDefinition, ChainStep, PipelineMessage};
use parking_lot::Mutex;

struct SetPayloadTask {
    name: oj_core::TaskName,
    key: &'static str,
}

#[async_trait]
impl Task for SetPayloadTask {
    fn name(&self) -> &oj_core::TaskName {
        &self.name
    }

    async fn run(&self, message: PipelineMessage) -> Result<serde_json::Value, TaskError> {
        let mut next = message;
        next.payload.insert(self.key.to_string(), serde_json::json!(true));
        Ok(serde_json::to_value(next).unwrap())
    }
}

struct FailingTask {
    name: oj_core::TaskName,
}

#[async_trait]
impl Task for FailingTask {
    fn name(&self) -> &oj_core::TaskName {
        &self.name
    }

    async fn run(&self, _message: PipelineMessage) -> Result<serde_json::Value, TaskError> {
        Err(TaskError::new("step2 exploded", "RuntimeError"))
    }
}

struct CountingTask {
    name: oj_core::TaskName,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Task for CountingTask {
    fn name(&self) -> &oj_core::TaskName {
        &self.name
    }

    async fn run(&self, message: PipelineMessage) -> Result<serde_json::Value, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::to_value(message).unwrap())
    }
}

/// Runs `chain` against `tasks` (keyed by task name), stopping at the first
/// task error or once the last step completes. Mirrors what a worker's
/// per-message loop across the middleware pipeline does, minus the broker.
async fn run_chain(chain: &ChainDefinition, tasks: &[Arc<dyn Task>], start: PipelineMessage) -> (Vec<String>, bool) {
    let mut message = start;
    let mut executed = Vec::new();
    let mut reached_end = false;

    for (index, step) in chain.steps.iter().enumerate() {
        let task = tasks
            .iter()
            .find(|t| t.name().as_str() == step.task_name.as_str())
            .expect("every step must have a registered task in this harness");
        executed.push(step.task_name.as_str().to_string());

        match task.run(message.clone()).await {
            Ok(value) => {
                message = decode_step_result(&value).expect("well-formed step output");
                if chain.is_last_step(index) {
                    reached_end = true;
                }
            }
            Err(_err) => break,
        }
    }

    (executed, reached_end)
}

#[tokio::test]
async fn two_step_pipeline_runs_in_order_and_propagates_payload() {
    let step1: Arc<dyn Task> = Arc::new(SetPayloadTask {
        name: "step1".into(),
        key: "done1",
    });
    let step2: Arc<dyn Task> = Arc::new(SetPayloadTask {
        name: "step2".into(),
        key: "done2",
    });

    let chain = ChainDefinition::new(
        "p2",
        vec![ChainStep::new("step1", "q.default"), ChainStep::new("step2", "q.default")],
    );

    let start = PipelineMessage::new("patient-1", "study-1");
    let (executed, reached_end) = run_chain(&chain, &[step1, step2], start).await;

    assert_eq!(executed, vec!["step1".to_string(), "step2".to_string()]);
    assert!(reached_end);
}

#[tokio::test]
async fn step2_observes_step1s_payload_before_setting_its_own() {
    struct ObservingTask {
        name: oj_core::TaskName,
        saw_done1: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl Task for ObservingTask {
        fn name(&self) -> &oj_core::TaskName {
            &self.name
        }

        async fn run(&self, message: PipelineMessage) -> Result<serde_json::Value, TaskError> {
            *self.saw_done1.lock() = message.payload.get("done1") == Some(&serde_json::json!(true));
            let mut next = message;
            next.payload.insert("done2".to_string(), serde_json::json!(true));
            Ok(serde_json::to_value(next).unwrap())
        }
    }

    let step1: Arc<dyn Task> = Arc::new(SetPayloadTask {
        name: "step1".into(),
        key: "done1",
    });
    let saw_done1 = Arc::new(Mutex::new(false));
    let step2: Arc<dyn Task> = Arc::new(ObservingTask {
        name: "step2".into(),
        saw_done1: saw_done1.clone(),
    });

    let chain = ChainDefinition::new(
        "p2",
        vec![ChainStep::new("step1", "q.default"), ChainStep::new("step2", "q.default")],
    );
    run_chain(&chain, &[step1, step2], PipelineMessage::new("patient-1", "study-1")).await;

    assert!(*saw_done1.lock());
}

#[tokio::test]
async fn a_failing_middle_step_halts_the_chain_before_the_final_step() {
    let calls = Arc::new(AtomicUsize::new(0));
    let step1: Arc<dyn Task> = Arc::new(SetPayloadTask {
        name: "step1".into(),
        key: "done1",
    });
    let step2: Arc<dyn Task> = Arc::new(FailingTask { name: "step2".into() });
    let step3: Arc<dyn Task> = Arc::new(CountingTask {
        name: "step3".into(),
        calls: calls.clone(),
    });

    let chain = ChainDefinition::new(
        "p3",
        vec![
            ChainStep::new("step1", "q.default"),
            ChainStep::new("step2", "q.default"),
            ChainStep::new("step3", "q.default"),
        ],
    );

    let (executed, reached_end) = run_chain(
        &chain,
        &[step1, step2, step3],
        PipelineMessage::new("patient-1", "study-1"),
    )
    .await;

    assert_eq!(executed, vec!["step1".to_string(), "step2".to_string()]);
    assert!(!reached_end);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "step3 must never run once step2 fails");
}

#[tokio::test]
#[ignore = "requires a running AMQP broker at RABBITMQ_URL"]
async fn two_step_pipeline_publishes_its_first_step_against_a_live_broker() {
    let amqp_url = std::env::var("RABBITMQ_URL").expect("RABBITMQ_URL must be set");
    let config = oj_broker::BrokerConfig::new(amqp_url, "oj.chain-sim-test");
    let broker = oj_broker::BrokerAdapter::connect(config).await.unwrap();

    let registry = Registry::new();
    registry
        .pipeline("p2")
        .step(
            Arc::new(SetPayloadTask { name: "step1".into(), key: "done1" }),
            "clarinet.sim-test",
        )
        .step(
            Arc::new(SetPayloadTask { name: "step2".into(), key: "done2" }),
            "clarinet.sim-test",
        )
        .register()
        .unwrap();

    let id_gen = oj_core::SequentialIdGen::new("pipeline");
    let pipeline_id = registry
        .run(
            "p2",
            &PipelineMessage::new("patient-1", "study-1"),
            oj_broker::Labels::new(),
            &broker,
            &id_gen,
        )
        .await
        .unwrap();

    assert!(pipeline_id.as_str().starts_with("pipeline-"));
}
