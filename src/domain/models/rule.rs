//! Automation rule domain model.
//!
//! An `AutomationRule` pairs a lifecycle trigger with a list of conditions
//! (implicit AND) and a list of actions. Rules are owned by a team and
//! evaluated by the `RuleEngine` whenever a matching trigger event arrives.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{TaskPriority, TaskSnapshot};

/// Task lifecycle events that can cause rules to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    TaskCreated,
    TaskUpdated,
    TaskCompleted,
    TaskAssigned,
    DueDateApproaching,
    TaskOverdue,
    CommentAdded,
    MilestoneCompleted,
    DependencyCompleted,
    TagAdded,
    PriorityChanged,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskCompleted => "task_completed",
            Self::TaskAssigned => "task_assigned",
            Self::DueDateApproaching => "due_date_approaching",
            Self::TaskOverdue => "task_overdue",
            Self::CommentAdded => "comment_added",
            Self::MilestoneCompleted => "milestone_completed",
            Self::DependencyCompleted => "dependency_completed",
            Self::TagAdded => "tag_added",
            Self::PriorityChanged => "priority_changed",
        }
    }
}

/// Task fields a condition can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionField {
    Priority,
    Assignee,
    Tags,
    DueDate,
    Title,
    Description,
}

/// Comparison operators for conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
}

/// A single boolean test against a task field.
///
/// `GreaterThan`/`LessThan` are only meaningful for date-valued or ordinal
/// fields; applying them elsewhere evaluates to `false` rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationCondition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub value: String,
}

impl AutomationCondition {
    pub fn new(field: ConditionField, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }
}

/// A single effect applied to a task when a rule fires.
///
/// Field-mutating variants carry their required parameters so a missing
/// parameter is unrepresentable. Delegated variants (watcher, notification,
/// subtask, milestone, comment, duplicate) are executed by the external task
/// store; the engine only records dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum AutomationAction {
    AssignUser { user_id: String },
    SetPriority { priority: TaskPriority },
    AddTag { tag: String },
    SetDueDate { due_date: NaiveDate },
    AddWatcher { user_id: String },
    SendNotification { message: String },
    CreateSubtask { title: String },
    MoveToMilestone { milestone_id: Uuid },
    AddComment { text: String },
    DuplicateTask,
}

impl AutomationAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssignUser { .. } => "assign_user",
            Self::SetPriority { .. } => "set_priority",
            Self::AddTag { .. } => "add_tag",
            Self::SetDueDate { .. } => "set_due_date",
            Self::AddWatcher { .. } => "add_watcher",
            Self::SendNotification { .. } => "send_notification",
            Self::CreateSubtask { .. } => "create_subtask",
            Self::MoveToMilestone { .. } => "move_to_milestone",
            Self::AddComment { .. } => "add_comment",
            Self::DuplicateTask => "duplicate_task",
        }
    }

    /// Whether execution is delegated to the external task store rather
    /// than applied through the mutation sink.
    pub fn is_delegated(&self) -> bool {
        matches!(
            self,
            Self::AddWatcher { .. }
                | Self::SendNotification { .. }
                | Self::CreateSubtask { .. }
                | Self::MoveToMilestone { .. }
                | Self::AddComment { .. }
                | Self::DuplicateTask
        )
    }
}

/// A declarative trigger -> conditions -> actions automation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub trigger: TriggerKind,
    /// Conditions combined by implicit AND, evaluated in order.
    pub conditions: Vec<AutomationCondition>,
    /// Actions executed in order when the rule fires.
    pub actions: Vec<AutomationAction>,
    /// Owning team; dispatch is always scoped to one team's rule set.
    pub team_id: Uuid,
    pub apply_to_new_tasks: bool,
    pub apply_to_existing_tasks: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Number of times this rule has fired.
    pub trigger_count: u64,
    /// Last time this rule fired.
    pub last_triggered_at: Option<DateTime<Utc>>,
}

/// Input for creating a rule. Counters are initialized by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger: TriggerKind,
    #[serde(default)]
    pub conditions: Vec<AutomationCondition>,
    pub actions: Vec<AutomationAction>,
    pub team_id: Uuid,
    #[serde(default = "default_true")]
    pub apply_to_new_tasks: bool,
    #[serde(default)]
    pub apply_to_existing_tasks: bool,
    pub created_by: String,
}

const fn default_true() -> bool {
    true
}

/// Partial update for an existing rule.
///
/// Conditions and actions are replaced wholesale when present; there is no
/// partial patching of either list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub trigger: Option<TriggerKind>,
    pub conditions: Option<Vec<AutomationCondition>>,
    pub actions: Option<Vec<AutomationAction>>,
}

/// A trigger event entering the engine.
///
/// `metadata` is trigger-specific detail (e.g. which field changed for
/// `PriorityChanged`). It is passed through for audit and never consulted
/// by condition evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    pub task: TaskSnapshot,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl TriggerEvent {
    pub fn new(kind: TriggerKind, task: TaskSnapshot) -> Self {
        Self {
            kind,
            task,
            metadata: serde_json::Value::Null,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Outcome of a single action within a rule execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    pub action: AutomationAction,
    pub success: bool,
    pub error: Option<String>,
}

impl ActionReport {
    pub fn ok(action: AutomationAction) -> Self {
        Self {
            action,
            success: true,
            error: None,
        }
    }

    pub fn failed(action: AutomationAction, error: impl Into<String>) -> Self {
        Self {
            action,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of one fired rule (or accepted suggestion) within a dispatch.
///
/// Partial failure is first-class data here, not an error: each action
/// reports success or failure individually and the caller decides whether
/// partial success is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Rule that fired, if this execution came from rule dispatch.
    pub rule_id: Option<Uuid>,
    /// Human-readable source: rule name or `suggestion:{id}`.
    pub source: String,
    pub task_id: Uuid,
    pub actions: Vec<ActionReport>,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionReport {
    /// True when every action in the report succeeded.
    pub fn fully_succeeded(&self) -> bool {
        self.actions.iter().all(|a| a.success)
    }
}
