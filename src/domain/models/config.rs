//! Engine configuration model.
//!
//! Tunable heuristics for workload analysis, prediction, and suggestion
//! generation. Defaults reproduce the engine's documented behavior; hosts
//! override them through the `ConfigLoader` (yaml + `TASKMILL_*` env).

use serde::{Deserialize, Serialize};

/// Main configuration structure for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Workload heuristic constants.
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Completion prediction constants.
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Keywords that trigger a priority-escalation suggestion.
    #[serde(default = "default_urgent_keywords")]
    pub urgent_keywords: Vec<String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workload: WorkloadConfig::default(),
            prediction: PredictionConfig::default(),
            urgent_keywords: default_urgent_keywords(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_urgent_keywords() -> Vec<String> {
    ["urgent", "asap", "critical", "emergency", "immediately", "blocker"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Constants behind the workload heuristic.
///
/// Estimated hours per task is a placeholder heuristic, not a measured
/// estimate; the analysis holds whatever value is configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkloadConfig {
    /// Fixed estimate per open task, in hours.
    #[serde(default = "default_hours_per_task")]
    pub hours_per_task: u32,

    /// Standard working week, in hours.
    #[serde(default = "default_week_hours")]
    pub week_hours: u32,

    /// Utilization percentage below which a member can take more work.
    #[serde(default = "default_capacity_threshold")]
    pub capacity_threshold: u32,

    /// Window for the due-soon count, in days.
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,
}

const fn default_hours_per_task() -> u32 {
    8
}

const fn default_week_hours() -> u32 {
    40
}

const fn default_capacity_threshold() -> u32 {
    80
}

const fn default_due_soon_days() -> i64 {
    7
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            hours_per_task: default_hours_per_task(),
            week_hours: default_week_hours(),
            capacity_threshold: default_capacity_threshold(),
            due_soon_days: default_due_soon_days(),
        }
    }
}

/// Constants behind completion prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PredictionConfig {
    /// Mean completion time assumed when the historical sample is empty,
    /// in days.
    #[serde(default = "default_mean_days")]
    pub default_mean_days: f64,

    /// Spread assumed when the sample has at most one entry, in days.
    #[serde(default = "default_spread_days")]
    pub default_spread_days: f64,

    /// Average completion time above which an urgent task is flagged
    /// high-risk, in days.
    #[serde(default = "default_urgent_slow_days")]
    pub urgent_slow_days: f64,
}

const fn default_mean_days() -> f64 {
    7.0
}

const fn default_spread_days() -> f64 {
    2.0
}

const fn default_urgent_slow_days() -> f64 {
    3.0
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_mean_days: default_mean_days(),
            default_spread_days: default_spread_days(),
            urgent_slow_days: default_urgent_slow_days(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json or pretty.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_heuristics() {
        let config = EngineConfig::default();
        assert_eq!(config.workload.hours_per_task, 8);
        assert_eq!(config.workload.week_hours, 40);
        assert_eq!(config.workload.capacity_threshold, 80);
        assert_eq!(config.workload.due_soon_days, 7);
        assert!((config.prediction.default_mean_days - 7.0).abs() < f64::EPSILON);
        assert!(config.urgent_keywords.contains(&"asap".to_string()));
    }
}
