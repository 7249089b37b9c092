// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin operational entry point: read environment knobs, connect the broker,
//! and consume every queue the capability flags imply. Concrete step/task
//! registration is the embedding application's job — see [`oj_worker`]'s
//! crate docs — so this binary starts with an empty [`oj_chain::Registry`],
//! which is still useful as a DLQ-only sink for malformed or unroutable
//! tasks and as the shape a real deployment's own `main` can copy.

use std::sync::Arc;

use oj_chain::Registry;
use oj_worker::{WorkerConfig, WorkerRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = WorkerConfig::from_env()?;
    let registry = Arc::new(Registry::new());
    let runtime = WorkerRuntime::new(config, registry).await?;
    runtime.run().await
}
