pub mod config;
pub mod insights;
pub mod recurrence;
pub mod rule;
pub mod task;

pub use config::{EngineConfig, LoggingConfig, PredictionConfig, WorkloadConfig};
pub use insights::{
    AssignmentStrategy, ImpactLevel, RiskFactor, RiskLevel, SmartSuggestion, SuggestionKind,
    TaskPrediction, TeamMember, WorkloadAnalysis,
};
pub use recurrence::{
    EndCondition, RecurrencePattern, RecurringConfigDraft, RecurringTaskConfig, TaskInstance,
};
pub use rule::{
    ActionReport, AutomationAction, AutomationCondition, AutomationRule, ConditionField,
    ConditionOperator, ExecutionReport, RuleDraft, RulePatch, TriggerEvent, TriggerKind,
};
pub use task::{Assignee, TaskPriority, TaskSnapshot};
