// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `decode(encode(x)) == x` for every wire shape the codec carries.

use oj_core::{decode_chain, decode_message, encode_chain, encode_message};
use oj_core::{ChainDefinition, ChainStep, PipelineMessage};

#[yare::parameterized(
    bare_message = { "patient-1", "study-1" },
    unicode_identifiers = { "patient-é", "study-ß" },
    empty_study = { "patient-2", "" },
)]
fn message_round_trips(patient_id: &str, study_uid: &str) {
    let message = PipelineMessage::new(patient_id, study_uid);
    let encoded = encode_message(&message).unwrap();
    let decoded = decode_message(&encoded).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn advanced_message_round_trips_with_pipeline_and_step_set() {
    let message = PipelineMessage::new("patient-1", "study-1").advance("extract-and-notify".into(), 2);
    let encoded = encode_message(&message).unwrap();
    let decoded = decode_message(&encoded).unwrap();
    assert_eq!(decoded, message);
}

#[yare::parameterized(
    single_step = { "pipeline-a", &[("extract", "clarinet.default")] },
    two_steps = { "pipeline-b", &[("extract", "clarinet.default"), ("notify", "clarinet.notify")] },
    three_steps = {
        "pipeline-c",
        &[("extract", "clarinet.default"), ("segment", "clarinet.gpu"), ("notify", "clarinet.notify")],
    },
)]
fn chain_definition_round_trips(pipeline_name: &str, steps: &[(&str, &str)]) {
    let chain = ChainDefinition::new(
        pipeline_name,
        steps.iter().map(|(task, queue)| ChainStep::new(*task, *queue)).collect(),
    );
    let encoded = encode_chain(&chain).unwrap();
    let decoded = decode_chain(&encoded).unwrap();
    assert_eq!(decoded, chain);
}
