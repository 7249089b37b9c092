// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The actions a flow dispatches once its trigger and condition (if any)
//! are satisfied. A discriminated union stands in for the original's
//! Pydantic-tagged model union.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use oj_apiclient::RecordApiClient;
use oj_core::RecordSnapshot;

/// Error surfaced by a [`CallHandler`] or [`InvalidateCallback`]. Boxed
/// rather than `anyhow`, which this workspace reserves for binaries.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A user-supplied callback invoked by the `call` action, with the
/// triggering record, the assembled context of related records, and the API
/// collaborator it may use to read or write further state.
#[async_trait]
pub trait CallHandler: Send + Sync {
    async fn call(
        &self,
        record: &RecordSnapshot,
        context: &BTreeMap<String, RecordSnapshot>,
        client: &dyn RecordApiClient,
    ) -> Result<(), ActionError>;
}

/// A user-supplied callback invoked once per record invalidated by an
/// `invalidate_records` action, with both the invalidated record and the
/// record whose status change triggered the invalidation.
#[async_trait]
pub trait InvalidateCallback: Send + Sync {
    async fn on_invalidated(
        &self,
        record: &RecordSnapshot,
        source: &RecordSnapshot,
        client: &dyn RecordApiClient,
    ) -> Result<(), ActionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateMode {
    Hard,
    Soft,
}

#[derive(Debug, Clone, Default)]
pub struct AddRecordAction {
    pub record_type_name: String,
    pub series_uid: Option<String>,
    pub user_id: Option<String>,
    pub context_info: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRecordAction {
    /// Name the target record is keyed under in the flow's context — the
    /// record type this flow's conditions already reference, not
    /// necessarily the record that triggered the flow.
    pub record_name: String,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct InvalidateRecordsAction {
    pub record_type_names: Vec<String>,
    pub mode: InvalidateMode,
    pub callback: Option<Arc<dyn InvalidateCallback>>,
}

#[derive(Clone)]
pub struct CallAction {
    pub handler: Arc<dyn CallHandler>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineAction {
    pub pipeline_name: String,
    pub extra_payload: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone)]
pub enum Action {
    AddRecord(AddRecordAction),
    UpdateRecord(UpdateRecordAction),
    InvalidateRecords(InvalidateRecordsAction),
    Call(CallAction),
    Pipeline(PipelineAction),
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
