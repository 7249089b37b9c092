// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One JSON file per pipeline-definitions table, written atomically.
//!
//! The write path mirrors the WAL's own atomic-rewrite discipline (see
//! `wal.rs`'s truncation path): write the full table to a temp file in the
//! same directory, `fsync` it, then rename over the real path. A reader never
//! observes a partially written file because rename is atomic on the same
//! filesystem.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use oj_core::PipelineDefinition;
use parking_lot::Mutex;

use crate::StorageError;

pub struct JsonFileStore {
    path: PathBuf,
    // Serializes writers; readers still see a consistent file via rename.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_table(&self) -> Result<BTreeMap<String, PipelineDefinition>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StorageError::Codec),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(StorageError::Io {
                path: self.path.display().to_string(),
                source: err,
            }),
        }
    }

    fn write_table(&self, table: &BTreeMap<String, PipelineDefinition>) -> Result<(), StorageError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let tmp_path = dir.join(format!(
            ".{}.tmp",
            self.path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("pipeline-definitions")
        ));

        let body = serde_json::to_vec_pretty(table).map_err(StorageError::Codec)?;
        {
            let mut tmp_file = File::create(&tmp_path).map_err(|source| StorageError::Io {
                path: tmp_path.display().to_string(),
                source,
            })?;
            tmp_file
                .write_all(&body)
                .map_err(|source| StorageError::Io {
                    path: tmp_path.display().to_string(),
                    source,
                })?;
            tmp_file.sync_all().map_err(|source| StorageError::Io {
                path: tmp_path.display().to_string(),
                source,
            })?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

impl crate::pipeline_store::PipelineDefinitionStore for JsonFileStore {
    fn upsert(&self, definition: PipelineDefinition) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut table = self.read_table()?;
        table.insert(definition.name.as_str().to_string(), definition);
        self.write_table(&table)
    }

    fn load(&self, name: &str) -> Result<Option<PipelineDefinition>, StorageError> {
        let table = self.read_table()?;
        Ok(table.get(name).cloned())
    }

    fn load_all(&self) -> Result<Vec<PipelineDefinition>, StorageError> {
        let table = self.read_table()?;
        Ok(table.into_values().collect())
    }
}

#[cfg(test)]
#[path = "json_file_store_tests.rs"]
mod tests;
