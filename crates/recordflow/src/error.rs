// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failure building or driving a [`crate::engine::RecordFlowEngine`]. Errors
/// raised by an individual action's own API calls are logged and swallowed
/// at the dispatch site rather than surfaced here — one misbehaving action
/// must not stop the rest of a flow from running.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Flow(#[from] oj_flow::FlowError),

    #[error(transparent)]
    Api(#[from] oj_apiclient::ApiClientError),

    #[error(transparent)]
    Chain(#[from] oj_chain::ChainError),
}
