// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazily-built comparison expressions, evaluated against a record context.
//!
//! The original DSL overloads `__eq__`/`__lt__`/etc. on a field-reference
//! object to build a comparison tree without evaluating it. Rust cannot
//! overload `PartialEq`/`PartialOrd` that way and still use them normally, so
//! [`FieldRef`] exposes explicit comparison methods instead.

use std::collections::BTreeMap;

use oj_core::RecordSnapshot;

/// A dot-addressed field on a named record in the flow's context, e.g.
/// `FieldRef::new("doctor_review", "data.confidence")`. Addressed the same
/// way [`RecordSnapshot::resolve_field`] addresses fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    record_name: String,
    field_path: String,
}

impl FieldRef {
    pub fn new(record_name: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            record_name: record_name.into(),
            field_path: field_path.into(),
        }
    }

    pub fn eq(&self, other: impl IntoOperand) -> ComparisonNode {
        self.compare(CompareOp::Eq, other)
    }

    pub fn ne(&self, other: impl IntoOperand) -> ComparisonNode {
        self.compare(CompareOp::Ne, other)
    }

    pub fn lt(&self, other: impl IntoOperand) -> ComparisonNode {
        self.compare(CompareOp::Lt, other)
    }

    pub fn le(&self, other: impl IntoOperand) -> ComparisonNode {
        self.compare(CompareOp::Le, other)
    }

    pub fn gt(&self, other: impl IntoOperand) -> ComparisonNode {
        self.compare(CompareOp::Gt, other)
    }

    pub fn ge(&self, other: impl IntoOperand) -> ComparisonNode {
        self.compare(CompareOp::Ge, other)
    }

    fn compare(&self, op: CompareOp, other: impl IntoOperand) -> ComparisonNode {
        ComparisonNode::Compare {
            left: Operand::Field(self.clone()),
            op,
            right: other.into_operand(),
        }
    }
}

/// Either side of a [`ComparisonNode::Compare`]: a field on a context record,
/// or a literal the caller passed in directly.
#[derive(Debug, Clone)]
pub enum Operand {
    Field(FieldRef),
    Const(String),
}

/// Conversion into an [`Operand`], implemented for [`FieldRef`] and for the
/// literal types a condition is commonly compared against.
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl IntoOperand for FieldRef {
    fn into_operand(self) -> Operand {
        Operand::Field(self)
    }
}

impl IntoOperand for &FieldRef {
    fn into_operand(self) -> Operand {
        Operand::Field(self.clone())
    }
}

impl IntoOperand for &str {
    fn into_operand(self) -> Operand {
        Operand::Const(self.to_string())
    }
}

impl IntoOperand for String {
    fn into_operand(self) -> Operand {
        Operand::Const(self)
    }
}

impl IntoOperand for i64 {
    fn into_operand(self) -> Operand {
        Operand::Const(self.to_string())
    }
}

impl IntoOperand for f64 {
    fn into_operand(self) -> Operand {
        Operand::Const(self.to_string())
    }
}

impl IntoOperand for bool {
    fn into_operand(self) -> Operand {
        Operand::Const(self.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A lazily-evaluated comparison tree: a single field comparison, or two
/// subtrees joined by `and`/`or`. Built by [`FieldRef`]'s comparison methods
/// and [`ComparisonNode::and`]/[`ComparisonNode::or`].
#[derive(Debug, Clone)]
pub enum ComparisonNode {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    And(Box<ComparisonNode>, Box<ComparisonNode>),
    Or(Box<ComparisonNode>, Box<ComparisonNode>),
}

impl ComparisonNode {
    pub fn and(self, other: ComparisonNode) -> ComparisonNode {
        ComparisonNode::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: ComparisonNode) -> ComparisonNode {
        ComparisonNode::Or(Box::new(self), Box::new(other))
    }

    /// Evaluate against a record context keyed by the record names the
    /// condition references. A record absent from the context, or a field
    /// path that resolves to nothing, makes the comparison it appears in
    /// `false` rather than raising — the engine assembles context from a
    /// flow's own declared fields, so an absence here means the record
    /// genuinely doesn't exist yet (e.g. a sibling type never created).
    pub fn evaluate(&self, context: &BTreeMap<String, RecordSnapshot>) -> bool {
        match self {
            ComparisonNode::Compare { left, op, right } => {
                evaluate_compare(left, *op, right, context)
            }
            ComparisonNode::And(left, right) => left.evaluate(context) && right.evaluate(context),
            ComparisonNode::Or(left, right) => left.evaluate(context) || right.evaluate(context),
        }
    }

    /// Record names this comparison references, for context assembly.
    pub fn referenced_records(&self, out: &mut Vec<String>) {
        match self {
            ComparisonNode::Compare { left, right, .. } => {
                if let Operand::Field(field) = left {
                    out.push(field.record_name.clone());
                }
                if let Operand::Field(field) = right {
                    out.push(field.record_name.clone());
                }
            }
            ComparisonNode::And(left, right) | ComparisonNode::Or(left, right) => {
                left.referenced_records(out);
                right.referenced_records(out);
            }
        }
    }
}

fn evaluate_compare(
    left: &Operand,
    op: CompareOp,
    right: &Operand,
    context: &BTreeMap<String, RecordSnapshot>,
) -> bool {
    let (Some(lv), Some(rv)) = (resolve_operand(left, context), resolve_operand(right, context))
    else {
        return false;
    };

    match op {
        CompareOp::Eq => lv == rv,
        CompareOp::Ne => lv != rv,
        CompareOp::Lt => ordering(&lv, &rv).is_some_and(|ord| ord.is_lt()),
        CompareOp::Le => ordering(&lv, &rv).is_some_and(|ord| ord.is_le()),
        CompareOp::Gt => ordering(&lv, &rv).is_some_and(|ord| ord.is_gt()),
        CompareOp::Ge => ordering(&lv, &rv).is_some_and(|ord| ord.is_ge()),
    }
}

fn resolve_operand(operand: &Operand, context: &BTreeMap<String, RecordSnapshot>) -> Option<String> {
    match operand {
        Operand::Const(value) => Some(value.clone()),
        Operand::Field(field) => context
            .get(&field.record_name)
            .map(|snapshot| snapshot.resolve_field(&field.field_path)),
    }
}

/// A resolved operand's natural type, for "natural typed comparison" per
/// spec.md §4.5: numbers compare numerically, booleans compare as booleans,
/// everything else compares as a string. Parsed in that priority order so a
/// numeric-looking string is never accidentally treated as a string.
enum NaturalValue {
    Num(f64),
    Bool(bool),
    Str(String),
}

fn classify(value: &str) -> NaturalValue {
    if let Ok(n) = value.parse::<f64>() {
        return NaturalValue::Num(n);
    }
    match value {
        "true" => NaturalValue::Bool(true),
        "false" => NaturalValue::Bool(false),
        _ => NaturalValue::Str(value.to_string()),
    }
}

/// Orders two resolved operands by their shared natural type. `None` when
/// the two sides' natural types genuinely differ (one numeric, one not) —
/// spec.md §4.5's "mixed-type ordering is false".
fn ordering(left: &str, right: &str) -> Option<std::cmp::Ordering> {
    match (classify(left), classify(right)) {
        (NaturalValue::Num(a), NaturalValue::Num(b)) => a.partial_cmp(&b),
        (NaturalValue::Bool(a), NaturalValue::Bool(b)) => Some(a.cmp(&b)),
        (NaturalValue::Num(_), _) | (_, NaturalValue::Num(_)) => None,
        (NaturalValue::Bool(_), _) | (_, NaturalValue::Bool(_)) => None,
        (NaturalValue::Str(a), NaturalValue::Str(b)) => Some(a.cmp(&b)),
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
