//! Derived analytics models: workload, predictions, and suggestions.
//!
//! These are computed on demand from task snapshots and history; none of
//! them is persisted or cached by the engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rule::AutomationAction;

/// A team member eligible for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
}

impl TeamMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Per-member workload figures, recomputed on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadAnalysis {
    pub user_id: String,
    pub user_name: String,
    pub active_tasks: u32,
    pub total_estimated_hours: u32,
    /// Estimated hours over the standard week, as a rounded percentage.
    pub utilization_percentage: u32,
    pub overloaded: bool,
    /// Assigned open tasks due within the next 7 days (inclusive of today).
    pub due_soon: u32,
    /// Assigned open tasks whose due date is strictly in the past.
    pub overdue: u32,
    pub can_take_more: bool,
    /// How many more standard tasks this member could absorb.
    pub suggested_capacity: u32,
}

/// Risk classification for a completion prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// How strongly a risk factor weighs on the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// A named contributor to prediction risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub impact: ImpactLevel,
    pub description: String,
}

/// Completion estimate for a task, derived from a historical sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPrediction {
    pub task_id: Uuid,
    pub predicted_completion_date: NaiveDate,
    /// 0-100.
    pub completion_probability: u32,
    pub risk_level: RiskLevel,
    pub estimated_hours: u32,
    /// Confidence interval around the predicted duration, in days.
    pub confidence_min_days: u32,
    pub confidence_max_days: u32,
    /// Completed historical tasks the sample was drawn from.
    pub similar_tasks: u32,
    /// All triggered risk factors; the highest-severity one determines
    /// `risk_level`.
    pub risk_factors: Vec<RiskFactor>,
}

/// Category of a smart suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    AutoAssign,
    Priority,
    DueDate,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoAssign => "auto_assign",
            Self::Priority => "priority",
            Self::DueDate => "due_date",
        }
    }
}

/// A proposed, not-yet-applied automation action surfaced for human review.
///
/// Accepting a suggestion routes `suggested_action` through the
/// `ActionExecutor`; the suggestion itself never mutates the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartSuggestion {
    pub id: Uuid,
    pub kind: SuggestionKind,
    pub task_id: Uuid,
    pub title: String,
    pub description: String,
    /// 0-100.
    pub confidence: u32,
    pub reasoning: String,
    pub suggested_action: AutomationAction,
    pub created_at: DateTime<Utc>,
    pub applied: bool,
    pub dismissed: bool,
}

/// Strategy for picking an assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    LeastBusy,
    RoundRobin,
    WorkloadBalance,
    PreviousSimilar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    #[test]
    fn test_suggestion_kind_str() {
        assert_eq!(SuggestionKind::AutoAssign.as_str(), "auto_assign");
        assert_eq!(SuggestionKind::DueDate.as_str(), "due_date");
    }
}
