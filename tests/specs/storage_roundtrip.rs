// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sync()` then `load()`/`load_all()` round-trips a registry's pipeline
//! definitions through both storage backends, and survives a fresh process
//! (a new `JsonFileStore` over the same path) for the file-backed one.

use std::sync::Arc;

use async_trait::async_trait;
use oj_chain::{Registry, Task, TaskError};
use oj_core::{PipelineMessage, TaskName};
use oj_storage::{InMemoryStore, JsonFileStore, PipelineDefinitionStore};

struct NoopTask {
    name: TaskName,
}

#[async_trait]
impl Task for NoopTask {
    fn name(&self) -> &TaskName {
        &self.name
    }

    async fn run(&self, message: PipelineMessage) -> Result<serde_json::Value, TaskError> {
        Ok(serde_json::to_value(message).unwrap())
    }
}

fn task(name: &str) -> Arc<dyn Task> {
    Arc::new(NoopTask { name: TaskName::new(name) })
}

fn populated_registry() -> Registry {
    let registry = Registry::new();
    registry
        .pipeline("extract-and-notify")
        .step(task("extract_series"), "clarinet.default")
        .step(task("notify"), "clarinet.notify")
        .register()
        .unwrap();
    registry.pipeline("solo").step(task("solo_task"), "clarinet.default").register().unwrap();
    registry
}

#[test]
fn in_memory_store_round_trips_every_synced_pipeline() {
    let registry = populated_registry();
    let store = InMemoryStore::new();
    registry.sync(&store).unwrap();

    let loaded = store.load("extract-and-notify").unwrap().unwrap();
    assert_eq!(loaded.name.as_str(), "extract-and-notify");
    assert_eq!(loaded.steps.len(), 2);
    assert_eq!(loaded.steps[0].get("task_name").map(String::as_str), Some("extract_series"));
    assert_eq!(loaded.steps[0].get("queue").map(String::as_str), Some("clarinet.default"));

    let mut names: Vec<_> = store.load_all().unwrap().into_iter().map(|def| def.name.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["extract-and-notify".to_string(), "solo".to_string()]);
}

#[test]
fn json_file_store_round_trips_through_a_fresh_handle_over_the_same_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipelines.json");

    {
        let registry = populated_registry();
        let store = JsonFileStore::new(&path);
        registry.sync(&store).unwrap();
    }

    // A brand-new store instance over the same file must see what the first
    // one wrote — the write path is atomic, not held in process memory.
    let reopened = JsonFileStore::new(&path);
    let loaded = reopened.load("extract-and-notify").unwrap().unwrap();
    assert_eq!(loaded.steps.len(), 2);

    let all = reopened.load_all().unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn json_file_store_upsert_is_idempotent_under_repeated_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipelines.json");
    let store = JsonFileStore::new(&path);

    let registry = populated_registry();
    registry.sync(&store).unwrap();
    registry.sync(&store).unwrap();

    assert_eq!(store.load_all().unwrap().len(), 2);
}

#[test]
fn loading_an_unknown_pipeline_name_returns_none_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("pipelines.json"));
    assert!(store.load("never-synced").unwrap().is_none());
}
