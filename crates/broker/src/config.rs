// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::backoff::BackoffConfig;

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub amqp_url: String,
    pub exchange: String,
    pub reconnect: BackoffConfig,
    pub max_reconnect_attempts: u32,
}

impl BrokerConfig {
    pub fn new(amqp_url: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            amqp_url: amqp_url.into(),
            exchange: exchange.into(),
            reconnect: BackoffConfig::default(),
            max_reconnect_attempts: 10,
        }
    }
}
