// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared across the black-box specification suite.

#![allow(dead_code)]

use std::collections::BTreeMap;

use oj_core::{RecordId, RecordSnapshot};

/// A bare record snapshot keyed so that two calls with the same
/// `(record_type, status, study_uid)` collide — callers that need distinct
/// ids should set `id` themselves after construction.
pub fn snapshot(record_type: &str, status: &str, study_uid: &str) -> RecordSnapshot {
    let now = chrono::Utc::now();
    RecordSnapshot {
        id: RecordId::new(format!("{record_type}-{status}-{study_uid}")),
        status: status.to_string(),
        record_type: record_type.to_string(),
        patient_id: "patient-1".to_string(),
        study_uid: study_uid.to_string(),
        series_uid: None,
        user_id: None,
        data: BTreeMap::new(),
        context_info: None,
        created_at: now,
        updated_at: now,
    }
}
