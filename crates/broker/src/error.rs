// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by the broker adapter.
///
/// `Transient` covers connection loss and anything the adapter's own
/// reconnect loop can recover from; everything else is a configuration or
/// protocol mistake that will not resolve itself on retry.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("transient broker error: {0}")]
    Transient(#[source] lapin::Error),

    #[error("failed to declare exchange/queue/binding for {queue}: {source}")]
    Declare {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to publish to {queue}: {source}")]
    Publish {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to encode message body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode message body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("queue {0:?} is not declared on this adapter")]
    UnknownQueue(String),

    #[error("reconnect attempts exhausted after {0} tries")]
    ReconnectExhausted(u32),
}

impl From<lapin::Error> for BrokerError {
    fn from(source: lapin::Error) -> Self {
        BrokerError::Transient(source)
    }
}
