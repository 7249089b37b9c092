// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize pipeline definitions: {0}")]
    Codec(#[source] serde_json::Error),

    #[error("pipeline {0:?} not found")]
    NotFound(String),
}
