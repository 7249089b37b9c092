// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline hand-off, abstracted behind a trait so the engine's own tests
//! don't need a live AMQP broker — the same split the API collaborator uses
//! between [`oj_apiclient::RecordApiClient`] and its HTTP implementation.

use async_trait::async_trait;
use oj_broker::{BrokerAdapter, Labels};
use oj_chain::Registry;
use oj_core::{IdGen, PipelineMessage};

use crate::error::EngineError;

/// Hands a message off to a named pipeline. The `pipeline` action dispatches
/// through this rather than calling [`Registry::run`] directly.
#[async_trait]
pub trait PipelineDispatcher: Send + Sync {
    async fn dispatch(&self, pipeline_name: &str, message: &PipelineMessage) -> Result<(), EngineError>;
}

/// The production dispatcher: a chain registry, a connected broker, and an
/// id generator, exactly what [`Registry::run`] needs.
pub struct ChainPipelineDispatcher<G: IdGen> {
    registry: std::sync::Arc<Registry>,
    broker: std::sync::Arc<BrokerAdapter>,
    id_gen: G,
}

impl<G: IdGen> ChainPipelineDispatcher<G> {
    pub fn new(registry: std::sync::Arc<Registry>, broker: std::sync::Arc<BrokerAdapter>, id_gen: G) -> Self {
        Self { registry, broker, id_gen }
    }
}

#[async_trait]
impl<G: IdGen> PipelineDispatcher for ChainPipelineDispatcher<G> {
    async fn dispatch(&self, pipeline_name: &str, message: &PipelineMessage) -> Result<(), EngineError> {
        self.registry
            .run(pipeline_name, message, Labels::new(), &self.broker, &self.id_gen)
            .await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use parking_lot::Mutex;

    use super::*;

    /// Records every dispatched pipeline hand-off in order, for assertions.
    #[derive(Default)]
    pub struct FakePipelineDispatcher {
        calls: Mutex<Vec<(String, PipelineMessage)>>,
    }

    impl FakePipelineDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<(String, PipelineMessage)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl PipelineDispatcher for FakePipelineDispatcher {
        async fn dispatch(&self, pipeline_name: &str, message: &PipelineMessage) -> Result<(), EngineError> {
            self.calls.lock().push((pipeline_name.to_string(), message.clone()));
            Ok(())
        }
    }
}
