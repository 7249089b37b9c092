// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use oj_core::PipelineDefinition;

use crate::StorageError;

/// A durable key-value table keyed by pipeline name.
///
/// `upsert` must be atomic: a reader never observes a half-written
/// definition. This is the only data the core itself persists. Synchronous,
/// matching the rest of this crate's WAL-derived atomic-write idiom — file
/// writes here are small and infrequent (one per `sync()` call), so there is
/// no need to push them onto an async executor.
pub trait PipelineDefinitionStore: Send + Sync {
    fn upsert(&self, definition: PipelineDefinition) -> Result<(), StorageError>;

    fn load(&self, name: &str) -> Result<Option<PipelineDefinition>, StorageError>;

    fn load_all(&self) -> Result<Vec<PipelineDefinition>, StorageError>;
}
