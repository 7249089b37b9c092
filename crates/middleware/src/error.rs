// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiddlewareError {
    #[error("chain protocol violation: {0}")]
    ChainProtocol(String),

    #[error(transparent)]
    Broker(#[from] oj_broker::BrokerError),
}
