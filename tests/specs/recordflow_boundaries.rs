// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boundary behaviors of the condition evaluator and the record-flow
//! engine's dispatch loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use oj_apiclient::{FakeRecordApiClient, FindRecordsQuery};
use oj_flow::{FieldRef, FlowRegistry, InvalidateMode, RecordLevels};
use oj_recordflow::{FakePipelineDispatcher, RecordFlowEngine};

use crate::support::snapshot;

async fn engine_with(flows: &FlowRegistry) -> (Arc<FakeRecordApiClient>, RecordFlowEngine) {
    let client = Arc::new(FakeRecordApiClient::new());
    let dispatcher = Arc::new(FakePipelineDispatcher::new());
    let engine = RecordFlowEngine::new(client.clone(), dispatcher, flows, RecordLevels::new()).unwrap();
    (client, engine)
}

#[test]
fn a_comparison_against_a_record_missing_from_the_context_evaluates_false() {
    let left = FieldRef::new("doctor_review", "data.diagnosis");
    let right = FieldRef::new("ai_analysis", "data.diagnosis");
    let condition = left.eq(right);

    // Only "doctor_review" is present in the assembled context; "ai_analysis"
    // never ran yet. The comparison must fail closed, not panic.
    let mut context = BTreeMap::new();
    context.insert("doctor_review".to_string(), snapshot("doctor_review", "finished", "U1"));

    assert!(!condition.evaluate(&context));
}

#[test]
fn a_comparison_against_an_empty_context_evaluates_false() {
    let condition = FieldRef::new("doctor_review", "data.confidence").lt(50_i64);
    assert!(!condition.evaluate(&BTreeMap::new()));
}

#[tokio::test]
async fn a_status_change_that_does_not_match_the_explicit_trigger_dispatches_nothing() {
    let flows = FlowRegistry::new();
    flows.record("doctor_review").on_status("finished").add_record("ai_analysis");

    let (client, engine) = engine_with(&flows).await;
    let trigger = snapshot("doctor_review", "in_progress", "U1");
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let created = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("ai_analysis"))
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn a_record_type_with_no_registered_flow_is_a_silent_no_op() {
    let flows = FlowRegistry::new();
    let (client, engine) = engine_with(&flows).await;
    let trigger = snapshot("untracked_type", "finished", "U1");
    client.seed(trigger.clone());

    // No panic, no error, nothing dispatched — there is simply no flow keyed
    // under this record type.
    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();
}

#[tokio::test]
async fn invalidate_records_never_touches_the_record_that_triggered_it() {
    let flows = FlowRegistry::new();
    flows
        .record("air_volume")
        .on_status("finished")
        .invalidate_records(vec!["air_volume".to_string()], InvalidateMode::Hard, None);

    let (client, engine) = engine_with(&flows).await;
    let trigger = snapshot("air_volume", "finished", "U1");
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let unchanged = client.get_record(&trigger.id).await.unwrap();
    assert_eq!(unchanged.status, "finished", "the triggering record itself must survive invalidation untouched");
}

#[tokio::test]
async fn an_unregistered_entity_kind_trigger_dispatches_nothing() {
    let flows = FlowRegistry::new();
    // No series()/study()/patient() flow was ever authored.
    let (client, engine) = engine_with(&flows).await;

    engine
        .handle_entity_created(oj_flow::EntityKind::Series, "patient-1", "U1", Some("U1.1"))
        .await
        .unwrap();

    let created = client.find_records(&FindRecordsQuery::by_study("U1")).await.unwrap();
    assert!(created.is_empty());
}
