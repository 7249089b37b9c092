// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-wide (but not-a-global-static) task and pipeline lookup
//! tables. Write-once per name at startup, read-many after, guarded by
//! `parking_lot::RwLock` rather than left to import-time side effects.

use std::collections::HashMap;
use std::sync::Arc;

use oj_broker::{
    routing_key_for_queue, BrokerAdapter, Labels, LABEL_CHAIN, LABEL_PIPELINE_ID,
    LABEL_ROUTING_KEY, LABEL_STEP_INDEX,
};
use oj_core::{encode_chain, ChainDefinition, IdGen, PipelineInstanceId, PipelineMessage};
use parking_lot::RwLock;

use crate::error::ChainError;
use crate::pipeline::PipelineBuilder;
use crate::task::Task;

#[derive(Default)]
pub struct Registry {
    pipelines: RwLock<HashMap<String, ChainDefinition>>,
    tasks: RwLock<HashMap<String, Arc<dyn Task>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a pipeline registered under `name`. Unique per process:
    /// `.register()` rejects a name already present.
    pub fn pipeline(&self, name: impl Into<oj_core::PipelineName>) -> PipelineBuilder<'_> {
        PipelineBuilder::new(self, name)
    }

    pub(crate) fn register_task(&self, task: Arc<dyn Task>) {
        self.tasks.write().insert(task.name().as_str().to_string(), task);
    }

    pub(crate) fn register_pipeline(&self, chain: ChainDefinition) -> Result<(), ChainError> {
        let mut pipelines = self.pipelines.write();
        if pipelines.contains_key(chain.pipeline_name.as_str()) {
            return Err(ChainError::DuplicatePipeline(chain.pipeline_name.clone()));
        }
        pipelines.insert(chain.pipeline_name.as_str().to_string(), chain);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ChainDefinition> {
        self.pipelines.read().get(name).cloned()
    }

    pub fn get_all(&self) -> Vec<ChainDefinition> {
        self.pipelines.read().values().cloned().collect()
    }

    pub fn get_task(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.tasks.read().get(name).cloned()
    }

    /// Upsert every in-memory pipeline into durable storage by name.
    pub fn sync(&self, storage: &dyn oj_storage::PipelineDefinitionStore) -> Result<(), ChainError> {
        for chain in self.get_all() {
            storage.upsert((&chain).into())?;
        }
        Ok(())
    }

    /// Validate non-empty, assign a fresh instance id and step index zero,
    /// and publish to the first step's queue.
    pub async fn run<G: IdGen>(
        &self,
        name: &str,
        message: &PipelineMessage,
        extra_labels: Labels,
        broker: &BrokerAdapter,
        id_gen: &G,
    ) -> Result<PipelineInstanceId, ChainError> {
        let chain = self
            .get(name)
            .ok_or_else(|| ChainError::UnknownPipeline(name.into()))?;
        chain.validate()?;

        // Allow expect here: validate() above already rejected an empty chain
        #[allow(clippy::expect_used)]
        let first_step = chain.step(0).expect("validate() guarantees at least one step");
        let pipeline_id = PipelineInstanceId::new(id_gen.next());

        let mut labels = extra_labels;
        labels.insert(LABEL_PIPELINE_ID.to_string(), pipeline_id.as_str().to_string());
        labels.insert(LABEL_STEP_INDEX.to_string(), "0".to_string());
        labels.insert(LABEL_CHAIN.to_string(), encode_chain(&chain)?);
        labels.insert(
            LABEL_ROUTING_KEY.to_string(),
            routing_key_for_queue(first_step.queue.as_str()).to_string(),
        );

        let advanced = message.advance(chain.pipeline_name.clone(), 0);
        let body = serde_json::to_value(&advanced).map_err(oj_broker::BrokerError::Encode)?;

        broker
            .publish(first_step.queue.as_str(), first_step.task_name.as_str(), body, labels)
            .await?;

        Ok(pipeline_id)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
