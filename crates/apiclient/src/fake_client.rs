// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory stand-in for [`RecordApiClient`], grounded in the teacher's
//! fake-adapter pattern (`oj-adapters`'s `agent/fake.rs`, `notify/fake.rs`):
//! deterministic, synchronous underneath, exposing the same async trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use oj_core::{RecordId, RecordSnapshot};
use parking_lot::RwLock;

use crate::client::{CreateRecordRequest, FindRecordsQuery, RecordApiClient};
use crate::error::ApiClientError;

#[derive(Default)]
pub struct FakeRecordApiClient {
    records: RwLock<BTreeMap<String, RecordSnapshot>>,
    next_id: RwLock<u64>,
}

impl FakeRecordApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing `create_record`'s id assignment.
    pub fn seed(&self, record: RecordSnapshot) {
        self.records.write().insert(record.id.as_str().to_string(), record);
    }

    fn next_record_id(&self) -> RecordId {
        let mut next_id = self.next_id.write();
        *next_id += 1;
        RecordId::new(format!("fake-record-{next_id}"))
    }
}

#[async_trait]
impl RecordApiClient for FakeRecordApiClient {
    async fn get_record(&self, id: &RecordId) -> Result<RecordSnapshot, ApiClientError> {
        self.records
            .read()
            .get(id.as_str())
            .cloned()
            .ok_or(ApiClientError::NotFound)
    }

    async fn find_records(
        &self,
        query: &FindRecordsQuery,
    ) -> Result<Vec<RecordSnapshot>, ApiClientError> {
        let records = self.records.read();
        let matches = records
            .values()
            .filter(|record| {
                query.patient_id.as_deref().map_or(true, |v| record.patient_id == v)
                    && query.study_uid.as_deref().map_or(true, |v| record.study_uid == v)
                    && query
                        .series_uid
                        .as_deref()
                        .map_or(true, |v| record.series_uid.as_deref() == Some(v))
                    && query
                        .record_type_name
                        .as_deref()
                        .map_or(true, |v| record.record_type == v)
                    && query.status.as_deref().map_or(true, |v| record.status == v)
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn create_record(
        &self,
        request: CreateRecordRequest,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let now = chrono::Utc::now();
        let record = RecordSnapshot {
            id: self.next_record_id(),
            status: "pending".to_string(),
            record_type: request.record_type_name,
            patient_id: request.patient_id,
            study_uid: request.study_uid,
            series_uid: request.series_uid,
            user_id: request.user_id,
            data: BTreeMap::new(),
            context_info: request.context_info,
            created_at: now,
            updated_at: now,
        };
        self.records
            .write()
            .insert(record.id.as_str().to_string(), record.clone());
        Ok(record)
    }

    async fn update_record_status(
        &self,
        id: &RecordId,
        status: &str,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let mut records = self.records.write();
        let record = records.get_mut(id.as_str()).ok_or(ApiClientError::NotFound)?;
        record.status = status.to_string();
        Ok(record.clone())
    }

    async fn update_record_data(
        &self,
        id: &RecordId,
        data: BTreeMap<String, serde_json::Value>,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let mut records = self.records.write();
        let record = records.get_mut(id.as_str()).ok_or(ApiClientError::NotFound)?;
        record.data = data;
        Ok(record.clone())
    }

    async fn append_context_info(
        &self,
        id: &RecordId,
        note: &str,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let mut records = self.records.write();
        let record = records.get_mut(id.as_str()).ok_or(ApiClientError::NotFound)?;
        record.context_info = Some(match record.context_info.take() {
            Some(existing) => format!("{existing}\n{note}"),
            None => note.to_string(),
        });
        Ok(record.clone())
    }
}

#[cfg(test)]
#[path = "fake_client_tests.rs"]
mod tests;
