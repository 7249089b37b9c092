// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `match_filename(resolve_pattern(pattern, record), pattern, record)` holds
//! for any pattern/record pair — resolution and matching must agree.

use oj_core::{match_filename, resolve_pattern, RecordId, RecordSnapshot};

use crate::support::snapshot;

fn with_confidence(mut record: RecordSnapshot, value: i64) -> RecordSnapshot {
    record.data.insert("confidence".to_string(), serde_json::json!(value));
    record
}

#[yare::parameterized(
    simple_id = { "result_{id}.json" },
    nested_data_field = { "conf_{data.confidence}.txt" },
    multiple_placeholders = { "seg_{study_uid}_{id}.seg.nrrd" },
    no_placeholders_at_all = { "static_name.json" },
    unresolvable_field = { "out_{nonexistent_field}.json" },
)]
fn resolved_pattern_always_matches_itself(pattern: &str) {
    let record = with_confidence(snapshot("ct_segmentation", "finished", "1.2.3.4.5"), 4);
    let resolved = resolve_pattern(pattern, &record);
    assert!(match_filename(&resolved, pattern, &record));
}

#[test]
fn a_missing_field_resolves_to_an_empty_placeholder_rather_than_erroring() {
    let record = snapshot("ct_segmentation", "finished", "1.2.3.4.5");
    assert_eq!(resolve_pattern("seg_{series_uid}.nrrd", &record), "seg_.nrrd");
}

#[test]
fn two_records_that_differ_only_in_the_resolved_field_do_not_cross_match() {
    let mut a = snapshot("ct_segmentation", "finished", "1.2.3.4.5");
    a.id = RecordId::new("alpha");
    let mut b = snapshot("ct_segmentation", "finished", "1.2.3.4.5");
    b.id = RecordId::new("beta");

    let pattern = "result_{id}.json";
    let resolved_for_a = resolve_pattern(pattern, &a);

    assert!(match_filename(&resolved_for_a, pattern, &a));
    assert!(!match_filename(&resolved_for_a, pattern, &b));
}
