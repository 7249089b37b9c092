// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The envelope carried between chain steps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PipelineName, RecordId};

/// The envelope carried between chain steps.
///
/// Created by the originator of a pipeline (an engine action, an API hook, or
/// a test harness); never mutated in place between steps, only copied with
/// updates via [`PipelineMessage::advance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMessage {
    pub patient_id: String,
    pub study_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub payload: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<PipelineName>,
    #[serde(default)]
    pub step_index: u32,
}

impl PipelineMessage {
    /// Build a bare message with no pipeline attached yet, step index zero.
    pub fn new(patient_id: impl Into<String>, study_uid: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            study_uid: study_uid.into(),
            series_uid: None,
            record_id: None,
            record_type: None,
            payload: BTreeMap::new(),
            pipeline_name: None,
            step_index: 0,
        }
    }

    /// Return a copy of this message with `pipeline_name` and `step_index` set,
    /// as performed at `.run()` time and at every chain hop.
    pub fn advance(&self, pipeline_name: PipelineName, step_index: u32) -> Self {
        let mut next = self.clone();
        next.pipeline_name = Some(pipeline_name);
        next.step_index = step_index;
        next
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
