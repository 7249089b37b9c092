// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Sentinel error string the retry middleware substitutes for a real error
/// once it has scheduled a republish, so the DLQ middleware (which runs
/// after it in the fixed post-execute order) can tell "will retry" apart
/// from "terminally failed" without the two middlewares coordinating beyond
/// this shared shape.
pub const RETRY_SCHEDULED: &str = "RetryScheduled";

/// The outcome of executing one task, as handed to `post_execute`.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    pub return_value: Option<serde_json::Value>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
    pub duration: Duration,
}

impl StepResult {
    pub fn ok(return_value: serde_json::Value, duration: Duration) -> Self {
        Self {
            return_value: Some(return_value),
            error: None,
            error_kind: None,
            duration,
        }
    }

    pub fn failed(error: impl Into<String>, error_kind: impl Into<String>, duration: Duration) -> Self {
        Self {
            return_value: None,
            error: Some(error.into()),
            error_kind: Some(error_kind.into()),
            duration,
        }
    }

    pub fn is_retry_scheduled(&self) -> bool {
        self.error.as_deref() == Some(RETRY_SCHEDULED)
    }
}
