//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every problem is
//! reported, not just the first.

use thiserror::Error;

use crate::config::schema::{AppConfig, BreakerConfig, ObservabilityConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("breaker.threshold must be greater than zero")]
    ZeroThreshold,

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a full application config.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = check_breaker(&config.breaker);
    errors.extend(check_observability(&config.observability));
    into_result(errors)
}

/// Validate only the breaker section.
pub fn validate_breaker(config: &BreakerConfig) -> Result<(), Vec<ValidationError>> {
    into_result(check_breaker(config))
}

/// Render errors as one comma-separated line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_breaker(config: &BreakerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if config.threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    errors
}

fn check_observability(config: &ObservabilityConfig) -> Vec<ValidationError> {
    let level = config.log_level.to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Vec::new()
    } else {
        vec![ValidationError::UnknownLogLevel(config.log_level.clone())]
    }
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
