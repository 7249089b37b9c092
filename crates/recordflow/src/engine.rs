// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The record-flow engine (C6): reacts to status changes, data updates, and
//! entity creation by evaluating registered flows and dispatching their
//! actions.

use std::collections::BTreeMap;
use std::sync::Arc;

use oj_apiclient::{FindRecordsQuery, RecordApiClient};
use oj_core::RecordSnapshot;
use oj_flow::{Action, EntityKind, FlowRecordDef, FlowRegistry, InvalidateMode, RecordLevels, TriggerKind};

use crate::dispatcher::PipelineDispatcher;
use crate::error::EngineError;

/// A record whose status changed, keyed by type, and the entity-creation
/// flows keyed by entity kind — the two index structures
/// [`RecordFlowEngine::new`] builds once from a [`FlowRegistry`] and never
/// mutates again.
pub struct RecordFlowEngine {
    api_client: Arc<dyn RecordApiClient>,
    dispatcher: Arc<dyn PipelineDispatcher>,
    record_flows: BTreeMap<String, FlowRecordDef>,
    entity_flows: BTreeMap<EntityKind, FlowRecordDef>,
    record_levels: RecordLevels,
}

impl RecordFlowEngine {
    /// Finalize every flow authored against `flows` and index it for
    /// dispatch. Returns an error if any flow definition is structurally
    /// invalid (e.g. a condition block with no actions).
    ///
    /// `record_levels` supplies the entity scope (series/study/patient) each
    /// record type's rows live at — record types absent from it default to
    /// study level. Context assembly only scopes a lookup by series when the
    /// looked-up type is series-level, and `add_record` only stamps a new
    /// record's `series_uid` when the type being created is series-level.
    pub fn new(
        api_client: Arc<dyn RecordApiClient>,
        dispatcher: Arc<dyn PipelineDispatcher>,
        flows: &FlowRegistry,
        record_levels: RecordLevels,
    ) -> Result<Self, EngineError> {
        let record_flows = flows
            .build_record_flows()?
            .into_iter()
            .map(|def| (def.key.clone(), def))
            .collect();
        let entity_flows = flows.build_entity_flows()?.into_iter().collect();
        Ok(Self {
            api_client,
            dispatcher,
            record_flows,
            entity_flows,
            record_levels,
        })
    }

    /// React to a record's status changing from `old_status` (`None` if this
    /// is the record's first status, i.e. its creation) to its current
    /// status. A flow with an explicit `.on_status(value)` trigger fires
    /// whenever the new status matches `value`, transition or not; a flow
    /// with no trigger value fires only on a genuine change.
    pub async fn handle_record_status_change(
        &self,
        record: &RecordSnapshot,
        old_status: Option<&str>,
    ) -> Result<(), EngineError> {
        let Some(flow) = self.record_flows.get(&record.record_type) else {
            return Ok(());
        };
        let fires = match &flow.trigger {
            TriggerKind::RecordStatus { value } => record.status == *value,
            TriggerKind::RecordAnyStatusChange => old_status.is_some_and(|old| old != record.status),
            TriggerKind::RecordDataUpdate | TriggerKind::EntityCreated(_) => false,
        };
        if !fires {
            return Ok(());
        }
        self.dispatch_flow(flow, record).await
    }

    /// React to a record's data payload being updated, independent of its
    /// status. Only fires flows registered with `.on_data_update()`.
    pub async fn handle_record_data_update(&self, record: &RecordSnapshot) -> Result<(), EngineError> {
        let Some(flow) = self.record_flows.get(&record.record_type) else {
            return Ok(());
        };
        if flow.trigger != TriggerKind::RecordDataUpdate {
            return Ok(());
        }
        self.dispatch_flow(flow, record).await
    }

    /// React to a `series`/`study`/`patient` entity being created. There is
    /// no backing record for an entity, so a synthetic trigger carrying the
    /// entity's identifiers stands in for one; actions read its identifiers
    /// the same way they read a real trigger record's.
    pub async fn handle_entity_created(
        &self,
        kind: EntityKind,
        patient_id: &str,
        study_uid: &str,
        series_uid: Option<&str>,
    ) -> Result<(), EngineError> {
        let Some(flow) = self.entity_flows.get(&kind) else {
            return Ok(());
        };
        let synthetic = synthetic_entity_trigger(kind, patient_id, study_uid, series_uid);
        self.dispatch_flow(flow, &synthetic).await
    }

    async fn dispatch_flow(&self, flow: &FlowRecordDef, trigger: &RecordSnapshot) -> Result<(), EngineError> {
        let context = self.assemble_context(trigger, flow).await?;

        for action in &flow.unconditional_actions {
            self.dispatch_action(action, trigger, &context).await;
        }

        let mut index = 0;
        while index < flow.conditions.len() {
            let block = &flow.conditions[index];
            let matched = block.matches(&context);
            if matched {
                for action in &block.actions {
                    self.dispatch_action(action, trigger, &context).await;
                }
            }

            // An else block immediately follows the if-chain it belongs to
            // and only runs when that chain did not match.
            if let Some(next) = flow.conditions.get(index + 1) {
                if next.is_else {
                    if !matched {
                        for action in &next.actions {
                            self.dispatch_action(action, trigger, &context).await;
                        }
                    }
                    index += 2;
                    continue;
                }
            }
            index += 1;
        }

        Ok(())
    }

    async fn assemble_context(
        &self,
        trigger: &RecordSnapshot,
        flow: &FlowRecordDef,
    ) -> Result<BTreeMap<String, RecordSnapshot>, EngineError> {
        let mut context = BTreeMap::new();
        context.insert(flow.key.clone(), trigger.clone());

        for name in flow.context_record_names() {
            if context.contains_key(&name) {
                continue;
            }
            let mut query = FindRecordsQuery::by_study(trigger.study_uid.clone()).with_record_type(name.clone());
            if self.record_levels.level_of(&name) == EntityKind::Series {
                if let Some(series_uid) = &trigger.series_uid {
                    query = query.with_series(series_uid.clone());
                }
            }
            if let Some(record) = self.api_client.find_records(&query).await?.into_iter().next() {
                context.insert(name, record);
            }
        }
        Ok(context)
    }

    /// Run one action, logging and swallowing its error so a single
    /// misbehaving action doesn't stop the rest of the flow from running.
    async fn dispatch_action(&self, action: &Action, trigger: &RecordSnapshot, context: &BTreeMap<String, RecordSnapshot>) {
        match action {
            Action::Call(call) => {
                if let Err(err) = call.handler.call(trigger, context, self.api_client.as_ref()).await {
                    tracing::warn!(error = %err, "call action failed, continuing with remaining actions");
                }
            }
            Action::AddRecord(add) => {
                if let Err(err) = self.run_add_record(add, trigger).await {
                    tracing::warn!(error = %err, "add_record action failed, continuing with remaining actions");
                }
            }
            Action::UpdateRecord(update) => {
                if let Err(err) = self.run_update_record(update, context).await {
                    tracing::warn!(error = %err, "update_record action failed, continuing with remaining actions");
                }
            }
            Action::InvalidateRecords(invalidate) => {
                if let Err(err) = self.run_invalidate_records(invalidate, trigger).await {
                    tracing::warn!(error = %err, "invalidate_records action failed, continuing with remaining actions");
                }
            }
            Action::Pipeline(pipeline) => {
                if let Err(err) = self.run_pipeline(pipeline, trigger).await {
                    tracing::warn!(error = %err, "pipeline action failed, continuing with remaining actions");
                }
            }
        }
    }

    async fn run_add_record(
        &self,
        action: &oj_flow::AddRecordAction,
        trigger: &RecordSnapshot,
    ) -> Result<(), EngineError> {
        let series_uid = action.series_uid.clone().or_else(|| {
            (self.record_levels.level_of(&action.record_type_name) == EntityKind::Series)
                .then(|| trigger.series_uid.clone())
                .flatten()
        });
        let request = oj_apiclient::CreateRecordRequest {
            record_type_name: action.record_type_name.clone(),
            patient_id: trigger.patient_id.clone(),
            study_uid: trigger.study_uid.clone(),
            series_uid,
            user_id: action.user_id.clone(),
            context_info: action.context_info.clone(),
        };
        self.api_client.create_record(request).await?;
        Ok(())
    }

    async fn run_update_record(
        &self,
        action: &oj_flow::UpdateRecordAction,
        context: &BTreeMap<String, RecordSnapshot>,
    ) -> Result<(), EngineError> {
        let Some(target) = context.get(&action.record_name) else {
            return Ok(());
        };
        if let Some(status) = &action.status {
            self.api_client.update_record_status(&target.id, status).await?;
        }
        Ok(())
    }

    async fn run_invalidate_records(
        &self,
        action: &oj_flow::InvalidateRecordsAction,
        trigger: &RecordSnapshot,
    ) -> Result<(), EngineError> {
        let note = format!("Invalidated by record {}", trigger.id);
        for type_name in &action.record_type_names {
            let query = FindRecordsQuery::by_study(trigger.study_uid.clone()).with_record_type(type_name.clone());
            let matches = self.api_client.find_records(&query).await?;
            for record in matches {
                if record.id == trigger.id {
                    // Never invalidate the record that caused the invalidation.
                    continue;
                }
                match action.mode {
                    InvalidateMode::Hard => {
                        self.api_client.update_record_status(&record.id, "pending").await?;
                        self.api_client.append_context_info(&record.id, &note).await?;
                    }
                    InvalidateMode::Soft => {
                        self.api_client.append_context_info(&record.id, &note).await?;
                    }
                }
                if let Some(callback) = &action.callback {
                    if let Err(err) = callback.on_invalidated(&record, trigger, self.api_client.as_ref()).await {
                        tracing::warn!(error = %err, "invalidate_records callback failed");
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_pipeline(&self, action: &oj_flow::PipelineAction, trigger: &RecordSnapshot) -> Result<(), EngineError> {
        let mut message = oj_core::PipelineMessage::new(trigger.patient_id.clone(), trigger.study_uid.clone());
        message.series_uid = trigger.series_uid.clone();
        message.record_id = Some(trigger.id.clone());
        message.record_type = Some(trigger.record_type.clone());
        message.payload = action.extra_payload.clone();
        self.dispatcher.dispatch(&action.pipeline_name, &message).await
    }
}

fn synthetic_entity_trigger(
    kind: EntityKind,
    patient_id: &str,
    study_uid: &str,
    series_uid: Option<&str>,
) -> RecordSnapshot {
    let now = chrono::Utc::now();
    RecordSnapshot {
        id: oj_core::RecordId::new(format!("entity:{}:{}", kind.as_str(), study_uid)),
        status: "created".to_string(),
        record_type: kind.as_str().to_string(),
        patient_id: patient_id.to_string(),
        study_uid: study_uid.to_string(),
        series_uid: series_uid.map(str::to_string),
        user_id: None,
        data: BTreeMap::new(),
        context_info: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
