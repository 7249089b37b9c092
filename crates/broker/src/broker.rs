// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The AMQP broker adapter: one direct exchange shared by all queues, a
//! routing key derived from the queue's own suffix, durable publish, and
//! manual acknowledgement per the configured [`AckPolicy`].

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, warn};

use crate::config::BrokerConfig;
use crate::envelope::{routing_key_for_queue, DlqEnvelope, Labels, TaskEnvelope};
use crate::error::BrokerError;
use crate::AckPolicy;

/// Owns the AMQP connection and per-queue declarations. Cheap to clone —
/// everything shared is behind an `Arc`.
pub struct BrokerAdapter {
    config: BrokerConfig,
    connection: tokio::sync::RwLock<Connection>,
    declared: RwLock<HashSet<String>>,
}

impl BrokerAdapter {
    /// Connect, retrying with jittered exponential backoff up to
    /// `config.max_reconnect_attempts`.
    pub async fn connect(config: BrokerConfig) -> Result<Self, BrokerError> {
        let connection = Self::connect_with_backoff(&config).await?;
        Ok(Self {
            config,
            connection: tokio::sync::RwLock::new(connection),
            declared: RwLock::new(HashSet::new()),
        })
    }

    async fn connect_with_backoff(config: &BrokerConfig) -> Result<Connection, BrokerError> {
        let mut attempt = 0;
        loop {
            match Connection::connect(&config.amqp_url, ConnectionProperties::default()).await {
                Ok(connection) => return Ok(connection),
                Err(err) if attempt < config.max_reconnect_attempts => {
                    let delay = config.reconnect.delay_for_attempt(attempt);
                    warn!(attempt, ?delay, error = %err, "broker connection failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(_) => return Err(BrokerError::ReconnectExhausted(attempt)),
            }
        }
    }

    /// Reconnect in place, replacing the held connection. Called by the
    /// worker's supervisory loop when it observes the connection has dropped.
    pub async fn reconnect(&self) -> Result<(), BrokerError> {
        let fresh = Self::connect_with_backoff(&self.config).await?;
        *self.connection.write().await = fresh;
        self.declared.write().clear();
        Ok(())
    }

    async fn channel(&self) -> Result<Channel, BrokerError> {
        let connection = self.connection.read().await;
        Ok(connection.create_channel().await?)
    }

    /// Idempotent declaration of exchange, queue, and binding
    /// `(exchange, routing_key = suffix(queue), queue)`.
    #[instrument(skip(self))]
    pub async fn declare(&self, queue: &str) -> Result<(), BrokerError> {
        if self.declared.read().contains(queue) {
            return Ok(());
        }

        let channel = self.channel().await?;
        let as_declare_err = |source| BrokerError::Declare {
            queue: queue.to_string(),
            source,
        };

        channel
            .exchange_declare(
                &self.config.exchange,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(as_declare_err)?;

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(as_declare_err)?;

        let routing_key = routing_key_for_queue(queue);
        channel
            .queue_bind(
                queue,
                &self.config.exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(as_declare_err)?;

        self.declared.write().insert(queue.to_string());
        debug!(queue, routing_key, "declared queue");
        Ok(())
    }

    /// Durable publish to the shared direct exchange, routed by the target
    /// queue's suffix.
    #[instrument(skip(self, message_body, labels))]
    pub async fn publish(
        &self,
        queue: &str,
        task_name: &str,
        message_body: serde_json::Value,
        labels: Labels,
    ) -> Result<(), BrokerError> {
        self.declare(queue).await?;

        let task_id = uuid::Uuid::new_v4().to_string();
        let envelope = TaskEnvelope::new(task_name, task_id)
            .with_arg(message_body)
            .with_labels(labels);
        let body = serde_json::to_vec(&envelope).map_err(BrokerError::Encode)?;

        self.publish_raw(queue, &body).await
    }

    async fn publish_raw(&self, queue: &str, body: &[u8]) -> Result<(), BrokerError> {
        let routing_key = routing_key_for_queue(queue);
        let channel = self.channel().await?;
        let as_publish_err = |source| BrokerError::Publish {
            queue: queue.to_string(),
            source,
        };

        channel
            .basic_publish(
                &self.config.exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(as_publish_err)?
            .await
            .map_err(as_publish_err)?;

        Ok(())
    }

    /// Durable publish to the dead-letter queue. Never returns an error to
    /// the caller: a DLQ that is itself unreachable is logged, not raised,
    /// so the consumer that called this does not fail a second time.
    #[instrument(skip(self, record))]
    pub async fn publish_dlq(&self, dlq_queue: &str, record: DlqEnvelope) {
        if let Err(err) = self.declare(dlq_queue).await {
            error!(error = %err, "failed to declare DLQ queue, dropping envelope");
            return;
        }
        let body = match serde_json::to_vec(&record) {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, "failed to encode DLQ envelope, dropping");
                return;
            }
        };
        if let Err(err) = self.publish_raw(dlq_queue, &body).await {
            error!(error = %err, task_name = %record.task_name, "DLQ publish failed");
        }
    }

    /// Start a consumer bound to `queue` with bounded concurrency, invoking
    /// `handler` for every delivery and acknowledging per `ack_policy`.
    ///
    /// `handler` is expected to never propagate an error: step failures are
    /// captured and fed to the middleware's post-execute chain by the caller
    /// (see `oj-middleware`), not raised here. A panic inside `handler`
    /// still aborts only that spawned task; the delivery is left unacked and
    /// is redelivered once the channel or connection is recreated.
    #[instrument(skip(self, handler))]
    pub async fn consume<H, Fut>(
        &self,
        queue: &str,
        concurrency: usize,
        ack_policy: AckPolicy,
        handler: H,
    ) -> Result<(), BrokerError>
    where
        H: Fn(TaskEnvelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.declare(queue).await?;
        let channel = self.channel().await?;
        let mut consumer = channel
            .basic_consume(
                queue,
                &format!("oj-worker-{queue}"),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let handler = Arc::new(handler);

        while let Some(delivery) = consumer.next().await {
            let delivery = delivery?;
            // Allow expect here: this semaphore is never closed, only acquired
            #[allow(clippy::expect_used)]
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            let handler = handler.clone();

            tokio::spawn(async move {
                let _permit = permit;

                let envelope: TaskEnvelope = match serde_json::from_slice(&delivery.data) {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        error!(error = %err, "malformed task envelope, acking and dropping");
                        let _ = delivery.ack(BasicAckOptions::default()).await;
                        return;
                    }
                };

                if ack_policy == AckPolicy::WhenReceived {
                    if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
                        error!(error = %err, "ack(when_received) failed");
                    }
                }

                (handler)(envelope).await;

                if matches!(ack_policy, AckPolicy::WhenExecuted | AckPolicy::WhenSaved) {
                    if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
                        error!(error = %err, "ack(post-handler) failed");
                    }
                }
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
