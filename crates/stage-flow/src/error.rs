use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::calendar::{PreferenceError, TermParseError};
use crate::workflows::eligibility::BatchFetchError;
use crate::workflows::gateway::GatewayError;
use crate::workflows::{ActionError, GuardViolation};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Fixture(serde_json::Error),
    Preference(PreferenceError),
    Term(TermParseError),
    Selection(GuardViolation),
    Load(BatchFetchError),
    Action(ActionError),
    Gateway(GatewayError),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Fixture(err) => write!(f, "fixture error: {}", err),
            AppError::Preference(err) => write!(f, "preference error: {}", err),
            AppError::Term(err) => write!(f, "invalid term: {}", err),
            AppError::Selection(err) => write!(f, "selection refused: {}", err),
            AppError::Load(err) => write!(f, "{} (retry to reload)", err),
            AppError::Action(err) => write!(f, "action error: {}", err),
            AppError::Gateway(err) => write!(f, "gateway error: {}", err),
            AppError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Fixture(err) => Some(err),
            AppError::Preference(err) => Some(err),
            AppError::Term(err) => Some(err),
            AppError::Selection(err) => Some(err),
            AppError::Load(err) => Some(err),
            AppError::Action(err) => Some(err),
            AppError::Gateway(err) => Some(err),
            AppError::NotFound(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Fixture(value)
    }
}

impl From<PreferenceError> for AppError {
    fn from(value: PreferenceError) -> Self {
        Self::Preference(value)
    }
}

impl From<TermParseError> for AppError {
    fn from(value: TermParseError) -> Self {
        Self::Term(value)
    }
}

impl From<GuardViolation> for AppError {
    fn from(value: GuardViolation) -> Self {
        Self::Selection(value)
    }
}

impl From<BatchFetchError> for AppError {
    fn from(value: BatchFetchError) -> Self {
        Self::Load(value)
    }
}

impl From<ActionError> for AppError {
    fn from(value: ActionError) -> Self {
        Self::Action(value)
    }
}

impl From<GatewayError> for AppError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}
