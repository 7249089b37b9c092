// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the broker adapter, the fixed middleware order, and the task
//! registry into one consume loop per bound queue, with a graceful drain on
//! SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::{Duration, Instant};

use oj_broker::{AckPolicy, BackoffConfig, BrokerAdapter, BrokerConfig, TaskEnvelope};
use oj_chain::Registry;
use oj_core::decode_step_result;
use oj_middleware::{
    ChainMiddleware, DlqMiddleware, LoggingMiddleware, Middleware, MiddlewarePipeline, RetryConfig,
    RetryMiddleware, StepResult,
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::WorkerConfig;

/// The single dead-letter queue every bound queue's terminally-failed tasks
/// publish to, sharing `clarinet`'s common prefix (spec.md §6.1).
const DLQ_QUEUE: &str = "clarinet.dead_letter";

/// How long [`WorkerRuntime::run`] waits after stopping new consumption
/// before returning, giving in-flight handlers a chance to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// The assembled worker: a connected broker, the task/pipeline registry an
/// embedding application populated, and the fixed middleware order built
/// from `config`.
pub struct WorkerRuntime {
    broker: Arc<BrokerAdapter>,
    registry: Arc<Registry>,
    middleware: Arc<MiddlewarePipeline>,
    config: WorkerConfig,
}

impl WorkerRuntime {
    /// Connect to the broker and build the fixed post-execute middleware
    /// order (retry, logging, DLQ, chain) per spec. `registry` is built and
    /// populated by the embedding application before this is called.
    pub async fn new(config: WorkerConfig, registry: Arc<Registry>) -> anyhow::Result<Self> {
        let broker_config = BrokerConfig {
            amqp_url: config.broker_url.clone(),
            exchange: config.exchange.clone(),
            reconnect: BackoffConfig::default(),
            max_reconnect_attempts: 10,
        };
        let broker = Arc::new(BrokerAdapter::connect(broker_config).await?);

        let retry_config = RetryConfig {
            max_attempts: config.retry_count,
            backoff: BackoffConfig {
                base_delay: config.retry_base_delay,
                max_delay: config.retry_max_delay,
                ..BackoffConfig::default()
            },
        };

        let stages: Vec<Box<dyn Middleware>> = vec![
            Box::new(RetryMiddleware::new(broker.clone(), retry_config)),
            Box::new(LoggingMiddleware),
            Box::new(DlqMiddleware::new(broker.clone(), DLQ_QUEUE)),
            Box::new(ChainMiddleware::new(broker.clone())),
        ];

        Ok(Self {
            broker,
            registry,
            middleware: Arc::new(MiddlewarePipeline::new(stages)),
            config,
        })
    }

    /// Start one consumer per queue implied by the capability flags, and
    /// block until a shutdown signal arrives. New consumption stops
    /// immediately; in-flight handlers (spawned independently by the broker
    /// adapter) are given [`SHUTDOWN_GRACE`] to finish before returning.
    pub async fn run(self) -> anyhow::Result<()> {
        let queues = self.config.queues();
        info!(?queues, concurrency = self.config.concurrency, "starting worker");

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(queues.len());
        for queue in queues {
            let broker = self.broker.clone();
            let registry = self.registry.clone();
            let middleware = self.middleware.clone();
            let concurrency = self.config.concurrency;
            let ack_policy = self.config.ack_policy;
            let queue_owned = queue.to_string();

            handles.push(tokio::spawn(async move {
                let handler_queue = queue_owned.clone();
                let result = broker
                    .consume(&queue_owned, concurrency, ack_policy, move |envelope| {
                        let registry = registry.clone();
                        let middleware = middleware.clone();
                        let queue = handler_queue.clone();
                        async move {
                            execute_one(&registry, &middleware, &queue, envelope).await;
                        }
                    })
                    .await;
                if let Err(err) = result {
                    error!(queue = %queue_owned, error = %err, "consumer loop ended with an error");
                }
            }));
        }

        wait_for_shutdown_signal().await;
        info!("shutdown signal received, stopping new consumption");
        for handle in &handles {
            handle.abort();
        }

        tokio::time::sleep(SHUTDOWN_GRACE).await;
        info!("grace period elapsed, worker exiting");
        Ok(())
    }
}

/// Run the task named by the envelope, time it, and feed the outcome
/// through the fixed post-execute middleware order. A task name absent from
/// the registry is itself a terminal failure — it is fed through the same
/// path so it is logged and dead-lettered rather than silently dropped.
async fn execute_one(
    registry: &Registry,
    middleware: &MiddlewarePipeline,
    queue: &str,
    envelope: TaskEnvelope,
) {
    let started = Instant::now();
    let mut result = match registry.get_task(&envelope.task_name) {
        Some(task) => {
            let message = match envelope.args.first().map(decode_step_result) {
                Some(Ok(message)) => message,
                Some(Err(err)) => {
                    warn!(task_name = %envelope.task_name, error = %err, "malformed task argument");
                    return finish_without_task(middleware, queue, &envelope, err.to_string(), started).await;
                }
                None => {
                    return finish_without_task(
                        middleware,
                        queue,
                        &envelope,
                        "task envelope carried no argument".to_string(),
                        started,
                    )
                    .await
                }
            };
            match task.run(message).await {
                Ok(value) => StepResult::ok(value, started.elapsed()),
                Err(err) => StepResult::failed(err.message, err.kind, started.elapsed()),
            }
        }
        None => StepResult::failed(
            format!("task {:?} is not registered on this worker", envelope.task_name),
            "UnknownTask",
            started.elapsed(),
        ),
    };

    if let Err(err) = middleware.post_execute(queue, &envelope, &mut result).await {
        error!(task_name = %envelope.task_name, error = %err, "middleware post_execute failed");
    }
}

async fn finish_without_task(
    middleware: &MiddlewarePipeline,
    queue: &str,
    envelope: &TaskEnvelope,
    error: String,
    started: Instant,
) {
    let mut result = StepResult::failed(error, "ChainProtocolError", started.elapsed());
    if let Err(err) = middleware.post_execute(queue, envelope, &mut result).await {
        error!(task_name = %envelope.task_name, error = %err, "middleware post_execute failed");
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    // Allow expect here: a process that cannot install a signal handler at
    // startup has no graceful-drain path left to fall back to
    #[allow(clippy::expect_used)]
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
