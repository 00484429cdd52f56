pub mod action_executor;
pub mod assignment;
pub mod condition;
pub mod engine;
pub mod prediction;
pub mod recurrence;
pub mod rule_engine;
pub mod suggestions;
pub mod workload;

pub use action_executor::ActionExecutor;
pub use engine::AutomationEngine;
pub use prediction::CompletionPredictor;
pub use recurrence::RecurrenceService;
pub use rule_engine::RuleEngine;
pub use suggestions::SuggestionService;
pub use workload::WorkloadAnalyzer;
