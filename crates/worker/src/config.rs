// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-driven configuration. Every knob but the broker URL has a
//! default, mirroring how `oj-daemon` resolves its own environment knobs in
//! `env.rs`.

use std::time::Duration;

use oj_broker::AckPolicy;

const DEFAULT_QUEUE: &str = "clarinet.default";
const GPU_QUEUE: &str = "clarinet.gpu";
const DICOM_QUEUE: &str = "clarinet.dicom";

pub struct WorkerConfig {
    pub broker_url: String,
    pub exchange: String,
    pub retry_count: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub ack_policy: AckPolicy,
    pub concurrency: usize,
    pub have_gpu: bool,
    pub have_dicom: bool,
}

impl WorkerConfig {
    /// Read every `WORKER_*` knob from the environment. Fails only if
    /// `WORKER_BROKER_URL` is unset; everything else falls back to a default.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let broker_url = std::env::var("WORKER_BROKER_URL")
            .map_err(|_| anyhow::anyhow!("WORKER_BROKER_URL must be set"))?;

        Ok(Self {
            broker_url,
            exchange: env_or("WORKER_EXCHANGE", "oj.tasks"),
            retry_count: env_parse_or("WORKER_RETRY_COUNT", 3),
            retry_base_delay: Duration::from_millis(env_parse_or("WORKER_RETRY_BASE_DELAY_MS", 200)),
            retry_max_delay: Duration::from_millis(env_parse_or("WORKER_RETRY_MAX_DELAY_MS", 30_000)),
            ack_policy: env_ack_policy_or("WORKER_ACK_POLICY", AckPolicy::WhenExecuted),
            concurrency: env_parse_or("WORKER_CONCURRENCY", 4),
            have_gpu: env_bool("WORKER_HAVE_GPU"),
            have_dicom: env_bool("WORKER_HAVE_DICOM"),
        })
    }

    /// Queues this worker should consume, given its capability flags. The
    /// default queue is always consumed.
    pub fn queues(&self) -> Vec<&'static str> {
        let mut queues = vec![DEFAULT_QUEUE];
        if self.have_gpu {
            queues.push(GPU_QUEUE);
        }
        if self.have_dicom {
            queues.push(DICOM_QUEUE);
        }
        queues
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str) -> bool {
    matches!(std::env::var(key).as_deref(), Ok("1") | Ok("true") | Ok("yes"))
}

fn env_ack_policy_or(key: &str, default: AckPolicy) -> AckPolicy {
    match std::env::var(key).as_deref() {
        Ok("when_received") => AckPolicy::WhenReceived,
        Ok("when_executed") => AckPolicy::WhenExecuted,
        Ok("when_saved") => AckPolicy::WhenSaved,
        _ => default,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
