//! Completion prediction.
//!
//! Estimates when a task will complete from an in-process sample of
//! completed historical tasks sharing its priority. This is statistics over
//! a caller-supplied sample, not a trained model.

use chrono::Duration;

use crate::domain::models::{
    ImpactLevel, PredictionConfig, RiskFactor, RiskLevel, TaskPrediction, TaskPriority,
    TaskSnapshot,
};

/// Hours assumed per estimated working day.
const HOURS_PER_DAY: f64 = 8.0;

/// Computes completion predictions from historical samples.
#[derive(Debug, Clone)]
pub struct CompletionPredictor {
    config: PredictionConfig,
}

impl Default for CompletionPredictor {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}

impl CompletionPredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }

    /// Predict completion for `task` given a historical sample.
    ///
    /// The sample is the completed tasks sharing the target's priority that
    /// carry both a creation and a due date. Risk determination is
    /// cumulative: every triggered factor is listed, and the highest
    /// severity among them decides `risk_level`.
    pub fn predict(&self, task: &TaskSnapshot, history: &[TaskSnapshot]) -> TaskPrediction {
        let durations = sample_durations(task.priority, history);
        let sample_size = durations.len();

        let mean_days = if durations.is_empty() {
            self.config.default_mean_days
        } else {
            durations.iter().sum::<f64>() / sample_size as f64
        };
        let spread_days = if sample_size <= 1 {
            self.config.default_spread_days
        } else {
            std_deviation(&durations, mean_days)
        };

        let predicted_completion_date =
            task.created_at.date_naive() + Duration::days(mean_days.round() as i64);
        let completion_probability = (60 + 5 * u32::try_from(sample_size).unwrap_or(0)).min(95);

        let (risk_level, risk_factors) = self.assess_risk(task, mean_days);

        let confidence_min_days = (mean_days - spread_days).max(0.0).round() as u32;
        let confidence_max_days = (mean_days + spread_days).round() as u32;

        tracing::debug!(
            task_id = %task.id,
            sample_size,
            mean_days,
            risk = ?risk_level,
            "completion predicted"
        );

        TaskPrediction {
            task_id: task.id,
            predicted_completion_date,
            completion_probability,
            risk_level,
            estimated_hours: (mean_days * HOURS_PER_DAY).round() as u32,
            confidence_min_days,
            confidence_max_days,
            similar_tasks: u32::try_from(sample_size).unwrap_or(u32::MAX),
            risk_factors,
        }
    }

    fn assess_risk(&self, task: &TaskSnapshot, mean_days: f64) -> (RiskLevel, Vec<RiskFactor>) {
        let mut level = RiskLevel::Low;
        let mut factors = Vec::new();

        if task.assignees.is_empty() {
            level = RiskLevel::High;
            factors.push(RiskFactor {
                name: "unassigned".into(),
                impact: ImpactLevel::High,
                description: "Task has no assignees".into(),
            });
        }

        if task.due_date.is_none() {
            level = level.max(RiskLevel::Medium);
            factors.push(RiskFactor {
                name: "no_due_date".into(),
                impact: ImpactLevel::Medium,
                description: "Task has no due date".into(),
            });
        }

        if task.priority == TaskPriority::Urgent && mean_days > self.config.urgent_slow_days {
            level = RiskLevel::High;
            factors.push(RiskFactor {
                name: "urgent_slow_history".into(),
                impact: ImpactLevel::High,
                description: format!(
                    "Urgent priority but similar tasks averaged {mean_days:.1} days"
                ),
            });
        }

        (level, factors)
    }
}

/// Durations in days of completed same-priority tasks, due date minus
/// creation date. Tasks without a due date contribute nothing.
fn sample_durations(priority: TaskPriority, history: &[TaskSnapshot]) -> Vec<f64> {
    history
        .iter()
        .filter(|t| t.completed && t.priority == priority)
        .filter_map(|t| {
            t.due_date
                .map(|due| (due - t.created_at.date_naive()).num_days() as f64)
        })
        .collect()
}

fn std_deviation(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
