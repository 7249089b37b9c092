// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fluent DSL surface: `record(name)`, `series()`/`study()`/`patient()`,
//! and the chained `.on_status()`/`.if_()`/`.add_record()`/... calls that
//! build up a [`crate::flow_record::FlowRecordDef`].
//!
//! `record(name)` must return the *same* builder on repeated calls within
//! one registration pass, the way the original's module-level registry
//! does. A [`FlowRegistry`] holds the map explicitly (no global) and hands
//! out `Arc<Mutex<BuilderInner>>`-backed handles so two calls with the same
//! name keep chaining onto the same definition.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::action::{
    Action, AddRecordAction, CallAction, CallHandler, InvalidateCallback, InvalidateMode,
    InvalidateRecordsAction, PipelineAction, UpdateRecordAction,
};
use crate::condition::{ComparisonNode, FieldRef};
use crate::error::FlowError;
use crate::flow_record::{ConditionBlock, FlowRecordDef};
use crate::trigger::{EntityKind, TriggerKind};

#[derive(Default)]
pub(crate) struct BuilderInner {
    key: String,
    trigger: Option<TriggerKind>,
    unconditional_actions: Vec<Action>,
    conditions: Vec<ConditionBlock>,
    current_condition: Option<usize>,
    /// Set by any chained DSL call; distinguishes a flow actually being
    /// authored from a bare `record(name)` reference used only to build a
    /// [`FieldRef`] inside another flow's condition — the latter must not
    /// show up as a flow of its own, mirroring the original's
    /// active-flow filter.
    touched: bool,
}

impl BuilderInner {
    fn new(key: String) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    fn set_trigger(&mut self, trigger: TriggerKind) {
        self.trigger = Some(trigger);
        self.touched = true;
    }

    fn start_if(&mut self, condition: ComparisonNode) {
        self.conditions.push(ConditionBlock {
            condition: Some(condition),
            is_else: false,
            actions: Vec::new(),
        });
        self.current_condition = Some(self.conditions.len() - 1);
        self.touched = true;
    }

    fn combine(&mut self, other: ComparisonNode, op: LogicOp) -> Result<(), FlowError> {
        let index = self.current_condition.ok_or(match op {
            LogicOp::And => FlowError::AndWithoutIf,
            LogicOp::Or => FlowError::OrWithoutIf,
        })?;
        let block = &mut self.conditions[index];
        let current = block.condition.take().ok_or(match op {
            LogicOp::And => FlowError::AndWithoutIf,
            LogicOp::Or => FlowError::OrWithoutIf,
        })?;
        block.condition = Some(match op {
            LogicOp::And => current.and(other),
            LogicOp::Or => current.or(other),
        });
        self.touched = true;
        Ok(())
    }

    fn start_else(&mut self) -> Result<(), FlowError> {
        if self.current_condition.is_none() {
            return Err(FlowError::ElseWithoutIf);
        }
        self.conditions.push(ConditionBlock {
            condition: None,
            is_else: true,
            actions: Vec::new(),
        });
        self.current_condition = Some(self.conditions.len() - 1);
        self.touched = true;
        Ok(())
    }

    fn push_action(&mut self, action: Action) {
        match self.current_condition {
            Some(index) => self.conditions[index].actions.push(action),
            None => self.unconditional_actions.push(action),
        }
        self.touched = true;
    }

    fn build(&self) -> Result<FlowRecordDef, FlowError> {
        for block in &self.conditions {
            if !block.is_else && block.actions.is_empty() {
                return Err(FlowError::ConditionHasNoActions(self.key.clone()));
            }
        }
        Ok(FlowRecordDef {
            key: self.key.clone(),
            trigger: self
                .trigger
                .clone()
                .unwrap_or(TriggerKind::RecordAnyStatusChange),
            unconditional_actions: self.unconditional_actions.clone(),
            conditions: self.conditions.clone(),
        })
    }
}

#[derive(Clone, Copy)]
enum LogicOp {
    And,
    Or,
}

/// Shared DSL methods common to record-type and entity flows. Implemented
/// directly on each handle type rather than as a trait, since the two
/// handles' `on_created`/`on_status` entry points differ by construction.
macro_rules! impl_shared_dsl {
    ($ty:ty) => {
        impl $ty {
            /// A reference to this flow's own subject's data, for building
            /// conditions, e.g. `handle.field("data.confidence")`.
            pub fn field(&self, path: impl Into<String>) -> FieldRef {
                FieldRef::new(self.inner.lock().key.clone(), path)
            }

            pub fn if_(self, condition: ComparisonNode) -> Self {
                self.inner.lock().start_if(condition);
                self
            }

            pub fn or_(self, condition: ComparisonNode) -> Result<Self, FlowError> {
                self.inner.lock().combine(condition, LogicOp::Or)?;
                Ok(self)
            }

            pub fn and_(self, condition: ComparisonNode) -> Result<Self, FlowError> {
                self.inner.lock().combine(condition, LogicOp::And)?;
                Ok(self)
            }

            pub fn else_(self) -> Result<Self, FlowError> {
                self.inner.lock().start_else()?;
                Ok(self)
            }

            pub fn add_record(self, record_type_name: impl Into<String>) -> Self {
                self.inner.lock().push_action(Action::AddRecord(AddRecordAction {
                    record_type_name: record_type_name.into(),
                    ..Default::default()
                }));
                self
            }

            pub fn add_record_with(self, action: AddRecordAction) -> Self {
                self.inner.lock().push_action(Action::AddRecord(action));
                self
            }

            pub fn update_record(self, record_name: impl Into<String>, status: impl Into<String>) -> Self {
                self.inner.lock().push_action(Action::UpdateRecord(UpdateRecordAction {
                    record_name: record_name.into(),
                    status: Some(status.into()),
                }));
                self
            }

            pub fn invalidate_records(
                self,
                record_type_names: Vec<String>,
                mode: InvalidateMode,
                callback: Option<Arc<dyn InvalidateCallback>>,
            ) -> Self {
                self.inner.lock().push_action(Action::InvalidateRecords(InvalidateRecordsAction {
                    record_type_names,
                    mode,
                    callback,
                }));
                self
            }

            pub fn call(self, handler: Arc<dyn CallHandler>) -> Self {
                self.inner.lock().push_action(Action::Call(CallAction { handler }));
                self
            }

            pub fn pipeline(self, pipeline_name: impl Into<String>) -> Self {
                self.inner.lock().push_action(Action::Pipeline(PipelineAction {
                    pipeline_name: pipeline_name.into(),
                    extra_payload: Default::default(),
                }));
                self
            }

            pub fn pipeline_with(self, action: PipelineAction) -> Self {
                self.inner.lock().push_action(Action::Pipeline(action));
                self
            }
        }
    };
}

/// A handle onto a `record(name)` flow definition, returned by
/// [`FlowRegistry::record`]. Cloning shares the same underlying definition.
#[derive(Clone)]
pub struct RecordFlowHandle {
    inner: Arc<Mutex<BuilderInner>>,
}

impl RecordFlowHandle {
    pub fn on_status(self, status: impl Into<String>) -> Self {
        self.inner.lock().set_trigger(TriggerKind::RecordStatus { value: status.into() });
        self
    }

    pub fn on_data_update(self) -> Self {
        self.inner.lock().set_trigger(TriggerKind::RecordDataUpdate);
        self
    }
}

impl_shared_dsl!(RecordFlowHandle);

/// A handle onto a `series()`/`study()`/`patient()` flow definition. Unlike
/// [`RecordFlowHandle`], the entity kind is a plain field set at
/// construction — no fallible extraction is needed in `on_created`.
#[derive(Clone)]
pub struct EntityFlowHandle {
    inner: Arc<Mutex<BuilderInner>>,
    kind: EntityKind,
}

impl EntityFlowHandle {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn on_created(self) -> Self {
        self.inner.lock().set_trigger(TriggerKind::EntityCreated(self.kind));
        self
    }
}

impl_shared_dsl!(EntityFlowHandle);

/// Process-wide (but not global) registry of in-progress flow builders,
/// mirroring `RECORD_REGISTRY`/`ENTITY_REGISTRY` from the original: repeated
/// calls with the same name/kind return the same handle.
#[derive(Default)]
pub struct FlowRegistry {
    records: RwLock<HashMap<String, Arc<Mutex<BuilderInner>>>>,
    entities: RwLock<HashMap<EntityKind, Arc<Mutex<BuilderInner>>>>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: impl Into<String>) -> RecordFlowHandle {
        let name = name.into();
        let inner = {
            let mut records = self.records.write();
            records
                .entry(name.clone())
                .or_insert_with(|| Arc::new(Mutex::new(BuilderInner::new(name.clone()))))
                .clone()
        };
        RecordFlowHandle { inner }
    }

    pub fn series(&self) -> EntityFlowHandle {
        self.entity(EntityKind::Series)
    }

    pub fn study(&self) -> EntityFlowHandle {
        self.entity(EntityKind::Study)
    }

    pub fn patient(&self) -> EntityFlowHandle {
        self.entity(EntityKind::Patient)
    }

    fn entity(&self, kind: EntityKind) -> EntityFlowHandle {
        let inner = {
            let mut entities = self.entities.write();
            entities
                .entry(kind)
                .or_insert_with(|| Arc::new(Mutex::new(BuilderInner::new(kind.as_str().to_string()))))
                .clone()
        };
        EntityFlowHandle { inner, kind }
    }

    /// Finalize every record-type flow that was actually authored (not just
    /// referenced from another flow's condition).
    pub fn build_record_flows(&self) -> Result<Vec<FlowRecordDef>, FlowError> {
        self.records
            .read()
            .values()
            .filter(|inner| inner.lock().touched)
            .map(|inner| inner.lock().build())
            .collect()
    }

    /// Finalize every entity flow that was actually authored, paired with
    /// the entity kind it applies to.
    pub fn build_entity_flows(&self) -> Result<Vec<(EntityKind, FlowRecordDef)>, FlowError> {
        self.entities
            .read()
            .iter()
            .filter(|(_, inner)| inner.lock().touched)
            .map(|(kind, inner)| Ok((*kind, inner.lock().build()?)))
            .collect()
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
