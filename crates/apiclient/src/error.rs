// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from the record API collaborator, mapped from HTTP status classes
/// per the engine's failure taxonomy: 401 auth, 404 missing, 409 conflict
/// (treated as success by the engine for idempotence — see
/// [`ApiClientError::Conflict`]'s doc), other 4xx validation, 5xx transient.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("authentication required or session expired")]
    Auth,

    #[error("record not found")]
    NotFound,

    /// The engine treats 409 as "already exists" for idempotence, not a
    /// failure; callers that care about the distinction can match on this
    /// variant directly rather than on a generic validation error.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error ({status}): {body}")]
    Validation { status: u16, body: String },

    #[error("transient server error ({status}): {body}")]
    Transient { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}
