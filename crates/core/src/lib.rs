// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-core: shared data model and codec for the workflow orchestration substrate

pub mod chain_def;
pub mod codec;
pub mod file_def;
pub mod file_pattern;
pub mod id;
pub mod message;
pub mod record;
pub mod time_fmt;

pub use chain_def::{ChainDefError, ChainDefinition, ChainStep, PipelineDefinition};
pub use codec::{
    decode_chain, decode_message, decode_step_result, encode_chain, encode_message, CodecError,
};
pub use file_def::FileDefinition;
pub use file_pattern::{
    find_matching_file, generate_filename, match_filename, resolve_pattern, PatternError,
};
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use message::PipelineMessage;
pub use record::RecordSnapshot;
pub use time_fmt::{format_elapsed, format_elapsed_ms};

// Newtype identifiers shared across crates.
crate::define_id! {
    /// Name of a registered pipeline.
    pub struct PipelineName;
}

crate::define_id! {
    /// Name of a registered task within the task registry.
    pub struct TaskName;
}

crate::define_id! {
    /// Name of an AMQP queue, e.g. `clarinet.gpu`.
    pub struct QueueName;
}

crate::define_id! {
    /// Identifier of a record as returned by the API collaborator.
    pub struct RecordId;
}

crate::define_id! {
    /// A running instance of a pipeline, assigned at `.run()` time.
    pub struct PipelineInstanceId;
}
