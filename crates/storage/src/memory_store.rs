// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A `RwLock`-guarded in-memory pipeline definition table, for engine and
//! chain tests that don't want filesystem dependence.

use std::collections::BTreeMap;

use oj_core::PipelineDefinition;
use parking_lot::RwLock;

use crate::{pipeline_store::PipelineDefinitionStore, StorageError};

#[derive(Default)]
pub struct InMemoryStore {
    table: RwLock<BTreeMap<String, PipelineDefinition>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineDefinitionStore for InMemoryStore {
    fn upsert(&self, definition: PipelineDefinition) -> Result<(), StorageError> {
        self.table
            .write()
            .insert(definition.name.as_str().to_string(), definition);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<PipelineDefinition>, StorageError> {
        Ok(self.table.read().get(name).cloned())
    }

    fn load_all(&self) -> Result<Vec<PipelineDefinition>, StorageError> {
        Ok(self.table.read().values().cloned().collect())
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
