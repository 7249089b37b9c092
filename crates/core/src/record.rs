// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The record snapshot consumed by the flow evaluator and the placeholder resolver.
//!
//! A snapshot is an immutable read of a record's identifiers, status, and data,
//! scoped to a single flow evaluation or a single placeholder resolution. The
//! core never mutates one; it is produced by the API-client contract and
//! handed in by value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::RecordId;

/// An immutable read of a record's identifiers, status, and data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub id: RecordId,
    pub status: String,
    pub record_type: String,
    pub patient_id: String,
    pub study_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_uid: Option<String>,
    /// Carried over from the original record model's file-pattern placeholders;
    /// not otherwise used by the flow evaluator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl RecordSnapshot {
    /// Resolve a dot-separated field path against this snapshot.
    ///
    /// Mirrors the original's dynamic attribute walk: simple identifier fields
    /// are looked up by name, `data.FIELD` and `record_type.FIELD` go one level
    /// deep, and anything else — unknown top-level field, path that runs past
    /// a leaf, missing data key — resolves to an empty string rather than
    /// erroring.
    pub fn resolve_field(&self, field_path: &str) -> String {
        let mut parts = field_path.splitn(2, '.');
        let head = parts.next().unwrap_or("");
        let rest = parts.next();

        match (head, rest) {
            ("id", None) => self.id.as_str().to_string(),
            ("status", None) => self.status.clone(),
            ("patient_id", None) => self.patient_id.clone(),
            ("study_uid", None) => self.study_uid.clone(),
            ("series_uid", None) => self.series_uid.clone().unwrap_or_default(),
            ("user_id", None) => self.user_id.clone().unwrap_or_default(),
            ("context_info", None) => self.context_info.clone().unwrap_or_default(),
            ("data", None) => serde_json::to_string(&self.data).unwrap_or_default(),
            ("data", Some(field)) if !field.contains('.') => self
                .data
                .get(field)
                .map(value_to_string)
                .unwrap_or_default(),
            ("record_type", None) => self.record_type.clone(),
            ("record_type", Some("name")) => self.record_type.clone(),
            _ => String::new(),
        }
    }
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
