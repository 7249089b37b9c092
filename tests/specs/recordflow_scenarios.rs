// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four record-flow scenarios: an unconditional flow, a true and a
//! false conditional branch with an `else`, and a cross-record comparison.

use std::sync::Arc;

use oj_apiclient::{FakeRecordApiClient, FindRecordsQuery};
use oj_flow::{FlowRegistry, RecordLevels};
use oj_recordflow::{FakePipelineDispatcher, RecordFlowEngine};

use crate::support::snapshot;

async fn engine_with(flows: &FlowRegistry) -> (Arc<FakeRecordApiClient>, RecordFlowEngine) {
    let client = Arc::new(FakeRecordApiClient::new());
    let dispatcher = Arc::new(FakePipelineDispatcher::new());
    let engine = RecordFlowEngine::new(client.clone(), dispatcher, flows, RecordLevels::new()).unwrap();
    (client, engine)
}

#[tokio::test]
async fn s1_unconditional_flow_produces_exactly_one_downstream_record() {
    let flows = FlowRegistry::new();
    flows.record("doctor_review").on_status("finished").add_record("ai_analysis");

    let (client, engine) = engine_with(&flows).await;
    let trigger = snapshot("doctor_review", "finished", "U1");
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let created = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("ai_analysis"))
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn s2_conditional_true_branch_fires_the_if_arm() {
    let flows = FlowRegistry::new();
    flows
        .record("doctor_review")
        .on_status("finished")
        .if_(flows.record("doctor_review").field("data.confidence").lt(70_i64))
        .add_record("expert_check");

    let (client, engine) = engine_with(&flows).await;
    let mut trigger = snapshot("doctor_review", "finished", "U1");
    trigger.data.insert("confidence".to_string(), serde_json::json!(50));
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let created = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("expert_check"))
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn s3_conditional_false_branch_falls_through_to_else() {
    let flows = FlowRegistry::new();
    flows
        .record("doctor_review")
        .on_status("finished")
        .if_(flows.record("doctor_review").field("data.confidence").lt(70_i64))
        .add_record("expert_check")
        .else_()
        .unwrap()
        .add_record("ai_analysis");

    let (client, engine) = engine_with(&flows).await;
    let mut trigger = snapshot("doctor_review", "finished", "U1");
    trigger.data.insert("confidence".to_string(), serde_json::json!(90));
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let expert = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("expert_check"))
        .await
        .unwrap();
    let ai = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("ai_analysis"))
        .await
        .unwrap();
    assert!(expert.is_empty());
    assert_eq!(ai.len(), 1);
}

#[tokio::test]
async fn s4_cross_record_comparison_pulls_the_related_record_into_context() {
    let flows = FlowRegistry::new();
    flows
        .record("doctor_review")
        .on_status("finished")
        .if_(
            flows
                .record("doctor_review")
                .field("data.diagnosis")
                .ne(flows.record("ai_analysis").field("data.diagnosis")),
        )
        .add_record("confirm_birads");

    let (client, engine) = engine_with(&flows).await;

    let mut ai = snapshot("ai_analysis", "finished", "U1");
    ai.data.insert("diagnosis".to_string(), serde_json::json!("benign"));
    client.seed(ai);

    let mut trigger = snapshot("doctor_review", "finished", "U1");
    trigger.data.insert("diagnosis".to_string(), serde_json::json!("malignant"));
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let created = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("confirm_birads"))
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn s4_agreeing_diagnoses_never_raise_the_discrepancy_flow() {
    let flows = FlowRegistry::new();
    flows
        .record("doctor_review")
        .on_status("finished")
        .if_(
            flows
                .record("doctor_review")
                .field("data.diagnosis")
                .ne(flows.record("ai_analysis").field("data.diagnosis")),
        )
        .add_record("confirm_birads");

    let (client, engine) = engine_with(&flows).await;

    let mut ai = snapshot("ai_analysis", "finished", "U1");
    ai.data.insert("diagnosis".to_string(), serde_json::json!("benign"));
    client.seed(ai);

    let mut trigger = snapshot("doctor_review", "finished", "U1");
    trigger.data.insert("diagnosis".to_string(), serde_json::json!("benign"));
    client.seed(trigger.clone());

    engine.handle_record_status_change(&trigger, Some("pending")).await.unwrap();

    let created = client
        .find_records(&FindRecordsQuery::by_study("U1").with_record_type("confirm_birads"))
        .await
        .unwrap();
    assert!(created.is_empty());
}
