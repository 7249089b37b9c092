// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::sync::Arc;

use oj_apiclient::FakeRecordApiClient;

use super::*;

struct RecordingHandler {
    called: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl CallHandler for RecordingHandler {
    async fn call(
        &self,
        _record: &RecordSnapshot,
        _context: &BTreeMap<String, RecordSnapshot>,
        _client: &dyn RecordApiClient,
    ) -> Result<(), ActionError> {
        self.called.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

fn snapshot() -> RecordSnapshot {
    let now = chrono::Utc::now();
    RecordSnapshot {
        id: oj_core::RecordId::new("1"),
        status: "finished".to_string(),
        record_type: "doctor_review".to_string(),
        patient_id: "p1".to_string(),
        study_uid: "1.2.3".to_string(),
        series_uid: None,
        user_id: None,
        data: BTreeMap::new(),
        context_info: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn call_action_invokes_handler_with_record_context_and_client() {
    let handler = Arc::new(RecordingHandler {
        called: std::sync::atomic::AtomicBool::new(false),
    });
    let action = CallAction {
        handler: handler.clone(),
    };
    let client = FakeRecordApiClient::new();
    let context = BTreeMap::new();

    action
        .handler
        .call(&snapshot(), &context, &client)
        .await
        .unwrap();

    assert!(handler.called.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn add_record_action_defaults_have_no_overrides() {
    let action = AddRecordAction {
        record_type_name: "expert_check".to_string(),
        ..Default::default()
    };
    assert_eq!(action.record_type_name, "expert_check");
    assert!(action.series_uid.is_none());
    assert!(action.user_id.is_none());
    assert!(action.context_info.is_none());
}

#[test]
fn invalidate_records_action_defaults_to_hard_mode_without_callback() {
    let action = InvalidateRecordsAction {
        record_type_names: vec!["air_volume".to_string()],
        mode: InvalidateMode::Hard,
        callback: None,
    };
    assert_eq!(action.mode, InvalidateMode::Hard);
    assert!(action.callback.is_none());
}
