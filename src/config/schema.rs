//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::error::ErrorKind;

/// Root configuration for the breaker demo and host integrations.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Circuit breaker configuration.
///
/// Immutable once handed to a breaker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Countable failures before the breaker trips.
    pub threshold: u32,

    /// Cool-down after a trip, in milliseconds. Zero resets on the next tick.
    pub reset_after_ms: u64,

    /// Error kinds that never count towards the threshold.
    pub ignored_kinds: BTreeSet<ErrorKind>,
}

impl BreakerConfig {
    /// Create a config with no ignored kinds.
    pub fn new(threshold: u32, reset_after: Duration) -> Self {
        Self {
            threshold,
            reset_after_ms: u64::try_from(reset_after.as_millis()).unwrap_or(u64::MAX),
            ignored_kinds: BTreeSet::new(),
        }
    }

    /// Add error kinds that the breaker should ignore.
    pub fn with_ignored<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ErrorKind>,
    {
        self.ignored_kinds.extend(kinds);
        self
    }

    pub fn reset_after(&self) -> Duration {
        Duration::from_millis(self.reset_after_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            reset_after_ms: 60_000,
            ignored_kinds: BTreeSet::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install the Prometheus recorder.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BreakerConfig::default();
        assert_eq!(config.threshold, 3);
        assert_eq!(config.reset_after(), Duration::from_secs(60));
        assert!(config.ignored_kinds.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [breaker]
            threshold = 5
            ignored_kinds = ["timeout", "rate_limited"]
            "#,
        )
        .unwrap();

        assert_eq!(config.breaker.threshold, 5);
        assert_eq!(config.breaker.reset_after_ms, 60_000);
        assert!(config.breaker.ignored_kinds.contains(&ErrorKind::Timeout));
        assert!(config.breaker.ignored_kinds.contains(&ErrorKind::RateLimited));
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_builder_helpers() {
        let config = BreakerConfig::new(2, Duration::from_millis(1500))
            .with_ignored([ErrorKind::Forbidden]);
        assert_eq!(config.reset_after_ms, 1500);
        assert_eq!(config.ignored_kinds.len(), 1);
    }

    #[test]
    fn test_huge_reset_saturates() {
        let config = BreakerConfig::new(1, Duration::MAX);
        assert_eq!(config.reset_after_ms, u64::MAX);
    }
}
