use std::env;
use std::time::Duration;

use crate::pipeline::SchedulerConfig;
use crate::shared::AppError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_GENERATION_API_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_GENERATION_MODEL: &str = "google/gemini-3-flash-preview";

/// Credentials and endpoint for the external generator
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

/// Process configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// `None` runs on in-memory stores
    pub database_url: Option<String>,
    /// `None` leaves the daily pipeline unconfigured
    pub generation: Option<GenerationConfig>,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = SchedulerConfig::default();

        let generation = get("GENERATION_API_KEY").map(|api_key| GenerationConfig {
            api_key,
            api_url: get("GENERATION_API_URL")
                .unwrap_or_else(|| DEFAULT_GENERATION_API_URL.to_string()),
            model: get("GENERATION_MODEL").unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
        });

        let scheduler = SchedulerConfig {
            enabled: match get("SCHEDULER_ENABLED") {
                Some(value) => parse_bool("SCHEDULER_ENABLED", &value)?,
                None => defaults.enabled,
            },
            leaderboard_interval: match get("LEADERBOARD_INTERVAL_SECS") {
                Some(value) => parse_secs("LEADERBOARD_INTERVAL_SECS", &value)?,
                None => defaults.leaderboard_interval,
            },
            daily_pipeline_interval: match get("DAILY_PIPELINE_INTERVAL_SECS") {
                Some(value) => parse_secs("DAILY_PIPELINE_INTERVAL_SECS", &value)?,
                None => defaults.daily_pipeline_interval,
            },
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: get("DATABASE_URL"),
            generation,
            scheduler,
        })
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, AppError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AppError::Configuration(format!(
            "{} must be a positive number of seconds, got '{}'",
            key, value
        ))),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.database_url.is_none());
        assert!(config.generation.is_none());
        assert!(config.scheduler.enabled);
        assert_eq!(config.scheduler.leaderboard_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_generation_defaults_apply_once_key_is_set() {
        let config = config_from(&[("GENERATION_API_KEY", "secret")]).unwrap();
        let generation = config.generation.unwrap();
        assert_eq!(generation.api_key, "secret");
        assert_eq!(generation.api_url, DEFAULT_GENERATION_API_URL);
        assert_eq!(generation.model, DEFAULT_GENERATION_MODEL);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/alfaaz"),
            ("SCHEDULER_ENABLED", "false"),
            ("DAILY_PIPELINE_INTERVAL_SECS", "600"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/alfaaz"));
        assert!(!config.scheduler.enabled);
        assert_eq!(config.scheduler.daily_pipeline_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_blank_key_counts_as_unset() {
        let config = config_from(&[("GENERATION_API_KEY", "  ")]).unwrap();
        assert!(config.generation.is_none());
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        assert!(matches!(
            config_from(&[("LEADERBOARD_INTERVAL_SECS", "0")]),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            config_from(&[("SCHEDULER_ENABLED", "sometimes")]),
            Err(AppError::Configuration(_))
        ));
    }
}
