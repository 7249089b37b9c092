// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing key derivation: the substring after the last `.` of a queue name,
//! used with one shared direct exchange to give each queue its own binding.

use oj_broker::routing_key_for_queue;

#[yare::parameterized(
    two_segment_queue = { "clarinet.default", "default" },
    three_segment_queue = { "clarinet.sub.queue", "queue" },
    single_segment_queue = { "default", "default" },
    gpu_queue = { "clarinet.gpu", "gpu" },
    dicom_queue = { "clarinet.dicom", "dicom" },
    dead_letter_queue = { "clarinet.dead_letter", "dead_letter" },
)]
fn routing_key_is_the_suffix_after_the_last_dot(queue: &str, expected: &str) {
    assert_eq!(routing_key_for_queue(queue), expected);
}

#[test]
fn two_queues_with_distinct_suffixes_bind_to_distinct_routing_keys() {
    let gpu = routing_key_for_queue("clarinet.gpu");
    let dicom = routing_key_for_queue("clarinet.dicom");
    assert_ne!(gpu, dicom);
}

#[test]
fn the_shared_dead_letter_queue_stays_isolated_from_the_live_default_queue() {
    // A single `clarinet.dead_letter` queue serves every source queue; it
    // must not share a routing key with `clarinet.default`, or a DLQ publish
    // would re-enter the live consumer's binding.
    let live = routing_key_for_queue("clarinet.default");
    let dead_letter = routing_key_for_queue("clarinet.dead_letter");
    assert_ne!(live, dead_letter);
}
