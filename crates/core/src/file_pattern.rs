// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholder resolution for file patterns.
//!
//! Ported from the original `file_patterns.py`: a pattern is a string sprinkled
//! with `{path}` placeholders; resolution substitutes each with the string
//! form of `record.<path>`. The function is total — a missing field never
//! raises, it resolves to an empty string, so step code never has to guard
//! against a resolution exception.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::RecordSnapshot;

/// Placeholder resolution never fails; this exists for API symmetry with the
/// other codec operations and to leave room for a future stricter mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Allow expect here as the regex is compile-time verified to be valid
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("constant regex pattern is valid"))
}

/// Replace every `{path}` in `pattern` with `record.resolve_field(path)`.
pub fn resolve_pattern(pattern: &str, record: &RecordSnapshot) -> String {
    placeholder_regex()
        .replace_all(pattern, |caps: &regex::Captures<'_>| {
            record.resolve_field(&caps[1])
        })
        .into_owned()
}

/// Alias for [`resolve_pattern`], kept for the same semantic clarity the
/// original gives `generate_filename`.
pub fn generate_filename(pattern: &str, record: &RecordSnapshot) -> String {
    resolve_pattern(pattern, record)
}

/// Exact-string equality between `filename` and the resolved pattern.
pub fn match_filename(filename: &str, pattern: &str, record: &RecordSnapshot) -> bool {
    filename == resolve_pattern(pattern, record)
}

/// Resolve `pattern` and check whether a regular file by that name exists in
/// `directory`. Returns the resolved filename on a hit.
pub fn find_matching_file(
    directory: &Path,
    pattern: &str,
    record: &RecordSnapshot,
) -> Option<String> {
    if !directory.exists() {
        return None;
    }
    let expected = resolve_pattern(pattern, record);
    if directory.join(&expected).is_file() {
        Some(expected)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "file_pattern_tests.rs"]
mod tests;
