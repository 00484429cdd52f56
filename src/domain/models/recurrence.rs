//! Recurring task configuration domain model.
//!
//! A `RecurringTaskConfig` is the template that defines how often a task
//! should be re-created and when the series stops. Pure date computation
//! lives in `services::recurrence`; materialization of concrete task
//! instances is a separate side-effecting step driven by an external
//! scheduling tick.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a recurring task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

/// When a recurring configuration stops generating occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndCondition {
    /// Never stops.
    #[default]
    Never,
    /// Stops after N occurrences have been materialized.
    AfterOccurrences { occurrences: u32 },
    /// Stops once the next occurrence would fall after this date.
    OnDate { end_date: NaiveDate },
}

/// A recurring task series definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTaskConfig {
    pub id: Uuid,
    /// Task used as the template for materialized instances.
    pub template_task_id: Uuid,
    pub enabled: bool,
    pub pattern: RecurrencePattern,
    /// Repeat every `interval` pattern units (>= 1).
    pub interval: u32,
    /// Target weekdays, 0 = Sunday .. 6 = Saturday. Only meaningful for
    /// weekly/biweekly patterns. Only the first entry is honored when
    /// computing the next occurrence.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// Target day of month (1-31), clamped to the month length. Only
    /// meaningful for the monthly pattern.
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_condition: EndCondition,
    /// Materialize instances this many days before their occurrence date.
    pub create_in_advance_days: u32,
    /// Copy the template's assignees onto materialized instances.
    pub auto_assign: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Number of instances materialized so far. Never incremented by
    /// dry-run previews.
    pub total_occurrences: u32,
    pub next_occurrence_date: Option<NaiveDate>,
}

/// Input for creating a recurring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringConfigDraft {
    pub template_task_id: Uuid,
    pub pattern: RecurrencePattern,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_condition: EndCondition,
    #[serde(default)]
    pub create_in_advance_days: u32,
    #[serde(default)]
    pub auto_assign: bool,
    pub created_by: String,
}

const fn default_interval() -> u32 {
    1
}

/// One concrete task instance generated from a recurring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: Uuid,
    pub config_id: Uuid,
    pub template_task_id: Uuid,
    /// The date this occurrence is scheduled for.
    pub occurrence_date: NaiveDate,
    /// 1-based position in the series.
    pub sequence: u32,
    /// Assignee ids copied from the template when `auto_assign` is set.
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_condition_serde() {
        let ec = EndCondition::AfterOccurrences { occurrences: 3 };
        let json = serde_json::to_value(ec).unwrap();
        assert_eq!(json["type"], "after_occurrences");
        assert_eq!(json["occurrences"], 3);

        let never: EndCondition = serde_json::from_value(serde_json::json!({"type": "never"})).unwrap();
        assert_eq!(never, EndCondition::Never);
    }
}
