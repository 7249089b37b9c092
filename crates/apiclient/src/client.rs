// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The record API collaborator contract consumed by the recordflow engine.

use std::collections::BTreeMap;

use async_trait::async_trait;
use oj_core::{RecordId, RecordSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::ApiClientError;

/// Criteria for `find_records`. All fields are optional filters; an absent
/// field imposes no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindRecordsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FindRecordsQuery {
    pub fn by_study(study_uid: impl Into<String>) -> Self {
        Self {
            study_uid: Some(study_uid.into()),
            ..Default::default()
        }
    }

    pub fn with_record_type(mut self, name: impl Into<String>) -> Self {
        self.record_type_name = Some(name.into());
        self
    }

    pub fn with_series(mut self, series_uid: impl Into<String>) -> Self {
        self.series_uid = Some(series_uid.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    pub record_type_name: String,
    pub patient_id: String,
    pub study_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<String>,
}

/// JSON over HTTP with cookie-session auth, as consumed by the recordflow
/// engine (`oj-recordflow`). Implementations must map HTTP status classes
/// onto [`ApiClientError`] per the contract's failure taxonomy.
#[async_trait]
pub trait RecordApiClient: Send + Sync {
    async fn get_record(&self, id: &RecordId) -> Result<RecordSnapshot, ApiClientError>;

    async fn find_records(
        &self,
        query: &FindRecordsQuery,
    ) -> Result<Vec<RecordSnapshot>, ApiClientError>;

    async fn create_record(
        &self,
        request: CreateRecordRequest,
    ) -> Result<RecordSnapshot, ApiClientError>;

    async fn update_record_status(
        &self,
        id: &RecordId,
        status: &str,
    ) -> Result<RecordSnapshot, ApiClientError>;

    async fn update_record_data(
        &self,
        id: &RecordId,
        data: BTreeMap<String, serde_json::Value>,
    ) -> Result<RecordSnapshot, ApiClientError>;

    /// Append a note to the record's `context_info` field (e.g. an
    /// invalidation reason); the server is responsible for the append, the
    /// client only sends the note text.
    async fn append_context_info(
        &self,
        id: &RecordId,
        note: &str,
    ) -> Result<RecordSnapshot, ApiClientError>;
}
