// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The finalized, immutable flow definition produced by [`crate::builder`].

use std::collections::BTreeMap;

use oj_core::RecordSnapshot;

use crate::action::Action;
use crate::condition::ComparisonNode;
use crate::trigger::TriggerKind;

/// One `if_`/`or_`/`and_`/`else_` block: an optional condition (`None` for
/// an unconditional block, which only `else_` produces) and the actions to
/// run when it matches.
#[derive(Clone, Default)]
pub struct ConditionBlock {
    pub condition: Option<ComparisonNode>,
    pub is_else: bool,
    pub actions: Vec<Action>,
}

impl ConditionBlock {
    /// Else blocks always match; a block with no condition at all (never
    /// produced by the builder today, but structurally possible) also
    /// always matches, mirroring the original's "no condition means always
    /// execute" rule.
    pub fn matches(&self, context: &BTreeMap<String, RecordSnapshot>) -> bool {
        if self.is_else {
            return true;
        }
        match &self.condition {
            Some(node) => node.evaluate(context),
            None => true,
        }
    }
}

/// A finalized flow definition: what triggers it, and the actions to run
/// unconditionally plus per matching condition block.
#[derive(Clone)]
pub struct FlowRecordDef {
    /// Record type name for a `record(name)` flow, or the entity's
    /// `EntityKind::as_str()` for an entity flow.
    pub key: String,
    pub trigger: TriggerKind,
    pub unconditional_actions: Vec<Action>,
    pub conditions: Vec<ConditionBlock>,
}

impl FlowRecordDef {
    /// Record names this flow's conditions reference, beyond its own key —
    /// used by the engine to assemble the context it evaluates against.
    pub fn referenced_record_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for block in &self.conditions {
            if let Some(condition) = &block.condition {
                condition.referenced_records(&mut names);
            }
        }
        names.sort();
        names.dedup();
        names
    }

    /// Every record name the engine must resolve into context before running
    /// this flow's actions: names referenced by conditions, plus the target
    /// of any `update_record` action (conditional or not), which needs the
    /// record present in context even when no condition mentions it.
    pub fn context_record_names(&self) -> Vec<String> {
        let mut names = self.referenced_record_names();
        collect_update_targets(&self.unconditional_actions, &mut names);
        for block in &self.conditions {
            collect_update_targets(&block.actions, &mut names);
        }
        names.sort();
        names.dedup();
        names
    }
}

fn collect_update_targets(actions: &[Action], names: &mut Vec<String>) {
    for action in actions {
        if let Action::UpdateRecord(update) = action {
            names.push(update.record_name.clone());
        }
    }
}

#[cfg(test)]
#[path = "flow_record_tests.rs"]
mod tests;
