// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use oj_core::{ChainDefError, PipelineName, TaskName};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("pipeline {0:?} is already registered")]
    DuplicatePipeline(PipelineName),

    #[error("pipeline {0:?} is not registered")]
    UnknownPipeline(PipelineName),

    #[error("task {0:?} is not registered")]
    UnknownTask(TaskName),

    #[error(transparent)]
    Invalid(#[from] ChainDefError),

    #[error(transparent)]
    Codec(#[from] oj_core::CodecError),

    #[error(transparent)]
    Broker(#[from] oj_broker::BrokerError),

    #[error(transparent)]
    Storage(#[from] oj_storage::StorageError),
}
