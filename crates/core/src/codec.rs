// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-neutral encode/decode for [`PipelineMessage`] and [`ChainDefinition`].
//!
//! The wire form is JSON: a self-describing object with stable field names.
//! Unknown fields are ignored rather than rejected on decode; absent optional
//! fields decode to their defaults. This is what lets a worker on a newer
//! build read a label written by an older one, and vice versa.

use thiserror::Error;

use crate::{ChainDefinition, PipelineMessage};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode: {0}")]
    Decode(#[source] serde_json::Error),
}

pub fn encode_message(message: &PipelineMessage) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(CodecError::Encode)
}

pub fn decode_message(body: &str) -> Result<PipelineMessage, CodecError> {
    serde_json::from_str(body).map_err(CodecError::Decode)
}

pub fn encode_chain(chain: &ChainDefinition) -> Result<String, CodecError> {
    serde_json::to_string(chain).map_err(CodecError::Encode)
}

pub fn decode_chain(label: &str) -> Result<ChainDefinition, CodecError> {
    serde_json::from_str(label).map_err(CodecError::Decode)
}

/// Decode the prior step's return value into a [`PipelineMessage`].
///
/// Accepts either an already-typed message or a bare JSON object literal with
/// the right shape (the chain middleware's step 4: "anything else is a
/// chain-protocol violation"). Callers map a decode failure onto their own
/// chain-protocol error.
pub fn decode_step_result(value: &serde_json::Value) -> Result<PipelineMessage, CodecError> {
    serde_json::from_value(value.clone()).map_err(CodecError::Decode)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
