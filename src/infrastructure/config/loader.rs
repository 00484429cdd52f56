use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::EngineConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid hours_per_task: {0}. Must be at least 1")]
    InvalidHoursPerTask(u32),

    #[error("Invalid week_hours: {0}. Must be at least 1")]
    InvalidWeekHours(u32),

    #[error("Invalid capacity_threshold: {0}. Must be between 1 and 100")]
    InvalidCapacityThreshold(u32),

    #[error("Invalid due_soon_days: {0}. Must be positive")]
    InvalidDueSoonDays(i64),

    #[error("Invalid default_mean_days: {0}. Must be positive")]
    InvalidMeanDays(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("urgent_keywords cannot contain empty entries")]
    EmptyUrgentKeyword,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. taskmill.yaml (project config, optional)
    /// 3. Environment variables (`TASKMILL_*` prefix, highest priority)
    pub fn load() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file("taskmill.yaml"))
            .merge(Env::prefixed("TASKMILL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
        if config.workload.hours_per_task == 0 {
            return Err(ConfigError::InvalidHoursPerTask(
                config.workload.hours_per_task,
            ));
        }

        if config.workload.week_hours == 0 {
            return Err(ConfigError::InvalidWeekHours(config.workload.week_hours));
        }

        if config.workload.capacity_threshold == 0 || config.workload.capacity_threshold > 100 {
            return Err(ConfigError::InvalidCapacityThreshold(
                config.workload.capacity_threshold,
            ));
        }

        if config.workload.due_soon_days <= 0 {
            return Err(ConfigError::InvalidDueSoonDays(config.workload.due_soon_days));
        }

        if config.prediction.default_mean_days <= 0.0 {
            return Err(ConfigError::InvalidMeanDays(
                config.prediction.default_mean_days,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.urgent_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyUrgentKeyword);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LoggingConfig, WorkloadConfig};

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.workload.hours_per_task, 8);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
workload:
  hours_per_task: 6
  week_hours: 35
urgent_keywords:
  - urgent
  - fire
logging:
  level: debug
  format: pretty
";

        let config: EngineConfig = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.workload.hours_per_task, 6);
        assert_eq!(config.workload.week_hours, 35);
        // Unset nested fields keep their defaults.
        assert_eq!(config.workload.capacity_threshold, 80);
        assert_eq!(config.urgent_keywords, vec!["urgent", "fire"]);
        assert_eq!(config.logging.level, "debug");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_hours_per_task() {
        let config = EngineConfig {
            workload: WorkloadConfig {
                hours_per_task: 0,
                ..WorkloadConfig::default()
            },
            ..EngineConfig::default()
        };

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::InvalidHoursPerTask(0))));
    }

    #[test]
    fn test_validate_bad_capacity_threshold() {
        let config = EngineConfig {
            workload: WorkloadConfig {
                capacity_threshold: 150,
                ..WorkloadConfig::default()
            },
            ..EngineConfig::default()
        };

        let result = ConfigLoader::validate(&config);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCapacityThreshold(150))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = EngineConfig {
            logging: LoggingConfig {
                level: "loud".to_string(),
                ..LoggingConfig::default()
            },
            ..EngineConfig::default()
        };

        let result = ConfigLoader::validate(&config);
        match result.unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_urgent_keyword() {
        let config = EngineConfig {
            urgent_keywords: vec!["urgent".to_string(), "  ".to_string()],
            ..EngineConfig::default()
        };

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::EmptyUrgentKeyword)));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "workload:\n  hours_per_task: 4\nprediction:\n  default_mean_days: 5.0"
        )
        .unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.workload.hours_per_task, 4);
        assert!((config.prediction.default_mean_days - 5.0).abs() < f64::EPSILON);
        // Untouched sections keep their defaults.
        assert_eq!(config.workload.week_hours, 40);
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "workload:\n  hours_per_task: 6\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win");
        assert_eq!(
            config.workload.hours_per_task, 6,
            "Base value should persist when not overridden"
        );
    }
}
