//! Condition evaluation.
//!
//! `evaluate` is a pure function from a task snapshot and a condition to a
//! boolean. It is fail-closed: an unsupported field/operator pairing or an
//! unparsable value makes the condition `false`, never an error, so a
//! single malformed rule cannot crash dispatch of the whole rule set.

use chrono::NaiveDate;

use crate::domain::models::{
    AutomationCondition, ConditionField, ConditionOperator, TaskPriority, TaskSnapshot,
};

/// A task field resolved to a typed value for operator dispatch.
enum FieldValue {
    Text(String),
    TextSet(Vec<String>),
    Date(Option<NaiveDate>),
    Rank(TaskPriority),
}

/// Resolve a condition field to its typed value on the given task.
fn resolve(task: &TaskSnapshot, field: ConditionField) -> FieldValue {
    match field {
        ConditionField::Priority => FieldValue::Rank(task.priority),
        ConditionField::Title => FieldValue::Text(task.title.clone()),
        ConditionField::Description => {
            FieldValue::Text(task.description.clone().unwrap_or_default())
        }
        ConditionField::Tags => {
            FieldValue::TextSet(task.tags.iter().map(|t| t.to_lowercase()).collect())
        }
        ConditionField::Assignee => FieldValue::TextSet(
            task.assignees
                .iter()
                .flat_map(|a| [a.id.to_lowercase(), a.name.to_lowercase()])
                .collect(),
        ),
        ConditionField::DueDate => FieldValue::Date(task.due_date),
    }
}

/// Evaluate a single condition against a task snapshot.
///
/// String comparisons are case-insensitive. For set-valued fields (tags,
/// assignee) `Equals` and `Contains` both test membership. `GreaterThan`
/// and `LessThan` compare chronologically for due dates and ordinally for
/// priority; anywhere else they evaluate to `false`.
pub fn evaluate(task: &TaskSnapshot, condition: &AutomationCondition) -> bool {
    let value = condition.value.to_lowercase();

    match (resolve(task, condition.field), condition.operator) {
        (FieldValue::Text(text), op) => {
            let text = text.to_lowercase();
            match op {
                ConditionOperator::Equals => text == value,
                ConditionOperator::Contains => text.contains(&value),
                ConditionOperator::StartsWith => text.starts_with(&value),
                ConditionOperator::EndsWith => text.ends_with(&value),
                ConditionOperator::GreaterThan | ConditionOperator::LessThan => false,
            }
        }
        (FieldValue::TextSet(set), ConditionOperator::Equals | ConditionOperator::Contains) => {
            set.iter().any(|entry| entry == &value)
        }
        (FieldValue::TextSet(_), _) => false,
        (FieldValue::Date(due), op) => {
            let Some(due) = due else { return false };
            let Ok(bound) = condition.value.trim().parse::<NaiveDate>() else {
                return false;
            };
            match op {
                ConditionOperator::Equals => due == bound,
                ConditionOperator::GreaterThan => due > bound,
                ConditionOperator::LessThan => due < bound,
                _ => false,
            }
        }
        (FieldValue::Rank(priority), op) => {
            let Some(bound) = TaskPriority::from_str(&value) else {
                return false;
            };
            match op {
                ConditionOperator::Equals => priority == bound,
                ConditionOperator::GreaterThan => priority > bound,
                ConditionOperator::LessThan => priority < bound,
                _ => false,
            }
        }
    }
}
