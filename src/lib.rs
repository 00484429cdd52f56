//! Taskmill - Task Automation and Recurrence Engine
//!
//! Taskmill is an embeddable engine for team task management: trigger-driven
//! automation rules, recurring task scheduling with calendar-aware date math,
//! and workload/prediction analytics over a host-supplied task store.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business models, error taxonomy, and
//!   the `TaskStore` / `MutationSink` ports the host implements
//! - **Service Layer** (`services`): Rule matching and dispatch, action
//!   execution, recurrence scheduling, workload analysis, completion
//!   prediction, and smart suggestions
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading,
//!   logging setup, and an in-memory store adapter
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskmill::{AutomationEngine, EngineConfig, InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let engine = AutomationEngine::new(store.clone(), store, EngineConfig::default());
//!     // Create rules, dispatch triggers, schedule recurrences...
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{EngineError, EngineResult};
pub use domain::models::{
    AssignmentStrategy, AutomationAction, AutomationCondition, AutomationRule, EndCondition,
    EngineConfig, ExecutionReport, LoggingConfig, RecurrencePattern, RecurringConfigDraft,
    RecurringTaskConfig, RuleDraft, RulePatch, SmartSuggestion, TaskInstance, TaskPrediction,
    TaskPriority, TaskSnapshot, TeamMember, TriggerEvent, TriggerKind, WorkloadAnalysis,
};
pub use domain::ports::{FieldUpdate, MutationSink, StoreError, TaskStore, TaskUpdate};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::init_logging;
pub use infrastructure::memory_store::InMemoryStore;
pub use services::{
    ActionExecutor, AutomationEngine, CompletionPredictor, RecurrenceService, RuleEngine,
    SuggestionService, WorkloadAnalyzer,
};
