// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised while the DSL is assembled, not while flows are evaluated —
/// evaluation itself is total (see [`crate::condition::ComparisonNode`]).
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("or_() must be called after if_()")]
    OrWithoutIf,

    #[error("and_() must be called after if_()")]
    AndWithoutIf,

    #[error("else_() must be called after if_()")]
    ElseWithoutIf,

    #[error("condition in flow '{0}' has no actions")]
    ConditionHasNoActions(String),
}
