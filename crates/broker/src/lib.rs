// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The broker adapter (C2): one AMQP connection, per-queue consumers,
//! routing key derived from queue suffix, publish with labels, DLQ publisher.

mod backoff;
mod broker;
mod config;
mod envelope;
mod error;

pub use backoff::BackoffConfig;
pub use broker::BrokerAdapter;
pub use config::BrokerConfig;
pub use envelope::{
    routing_key_for_queue, AckPolicy, DlqEnvelope, Labels, TaskEnvelope, LABEL_ATTEMPT,
    LABEL_CHAIN, LABEL_PIPELINE_ID, LABEL_ROUTING_KEY, LABEL_STEP_INDEX,
};
pub use error::BrokerError;
