use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::aggregation::LookupPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub enrichment: EnrichmentConfig,
    pub preferences: PreferenceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let timeout_ms = read_u64("STAGE_LOOKUP_TIMEOUT_MS", 5_000)?;
        if timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let max_retries = read_u64("STAGE_LOOKUP_MAX_RETRIES", 1)?;
        let max_retries =
            u32::try_from(max_retries).map_err(|_| ConfigError::InvalidNumber {
                var: "STAGE_LOOKUP_MAX_RETRIES",
                value: max_retries.to_string(),
            })?;
        let backoff_base_ms = read_u64("STAGE_LOOKUP_BACKOFF_BASE_MS", 100)?;
        let backoff_max_ms = read_u64("STAGE_LOOKUP_BACKOFF_MAX_MS", 2_000)?;
        let retain_previous_facts = read_bool("STAGE_RETAIN_PREVIOUS_FACTS", true)?;

        let preference_path = env::var("STAGE_PREFERENCE_PATH")
            .unwrap_or_else(|_| ".stage-flow/preferences.json".to_string());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            enrichment: EnrichmentConfig {
                lookup: LookupPolicy {
                    timeout: Duration::from_millis(timeout_ms),
                    max_retries,
                    backoff_base: Duration::from_millis(backoff_base_ms),
                    backoff_max: Duration::from_millis(backoff_max_ms.max(backoff_base_ms)),
                },
                retain_previous_facts,
            },
            preferences: PreferenceConfig {
                path: PathBuf::from(preference_path),
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Dependent lookup bounds and the loading presentation.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub lookup: LookupPolicy,
    pub retain_previous_facts: bool,
}

/// Where durable term preferences live.
#[derive(Debug, Clone)]
pub struct PreferenceConfig {
    pub path: PathBuf,
}

fn read_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn read_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool { var, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    InvalidBool { var: &'static str, value: String },
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer (found '{value}')")
            }
            ConfigError::InvalidBool { var, value } => {
                write!(f, "{var} must be true or false (found '{value}')")
            }
            ConfigError::ZeroTimeout => write!(f, "STAGE_LOOKUP_TIMEOUT_MS must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}
