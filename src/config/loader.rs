//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{describe, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", describe(.0))]
    Validation(Vec<ValidationError>),
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [breaker]
            threshold = 4
            reset_after_ms = 250

            [observability]
            log_level = "debug"
            metrics_enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.breaker.threshold, 4);
        assert_eq!(config.breaker.reset_after_ms, 250);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_parse_rejects_zero_threshold() {
        let err = parse_config("[breaker]\nthreshold = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = parse_config("[breaker]\nignored_kinds = [\"cosmic_ray\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("breaker-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[breaker]\nthreshold = 7\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.breaker.threshold, 7);

        fs::remove_file(&path).unwrap_or_default();
    }
}
