use crate::error::{Result, SwimlaneError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Lifetime of a persisted column record, refreshed on every write
    pub ttl_ms: u64,
    /// Storage keys are `<key_prefix>:<column>`
    pub key_prefix: String,
    /// Lower bound for the placeholder height while dragging
    pub placeholder_min_height: f64,
}

impl BoardConfig {
    pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
    pub const DEFAULT_KEY_PREFIX: &'static str = "cards";
    /// Largest TTL whose expiry still fits a signed epoch-millisecond stamp
    pub const MAX_TTL_MS: u64 = i64::MAX as u64;

    /// Parses a host-supplied JSON configuration. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: BoardConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl_ms == 0 {
            return Err(SwimlaneError::ConfigError(
                "ttl_ms must be greater than zero".to_string(),
            ));
        }
        if self.ttl_ms > Self::MAX_TTL_MS {
            return Err(SwimlaneError::ConfigError(format!(
                "ttl_ms must be at most {}, got {}",
                Self::MAX_TTL_MS,
                self.ttl_ms
            )));
        }
        if self.key_prefix.trim().is_empty() {
            return Err(SwimlaneError::ConfigError(
                "key_prefix must not be empty".to_string(),
            ));
        }
        if !self.placeholder_min_height.is_finite() || self.placeholder_min_height < 0.0 {
            return Err(SwimlaneError::ConfigError(format!(
                "placeholder_min_height must be a non-negative number, got {}",
                self.placeholder_min_height
            )));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = u64::try_from(ttl.as_millis())
            .unwrap_or(u64::MAX)
            .min(Self::MAX_TTL_MS);
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            ttl_ms: Self::DEFAULT_TTL_MS,
            key_prefix: Self::DEFAULT_KEY_PREFIX.to_string(),
            placeholder_min_height: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(300));
        assert_eq!(config.key_prefix, "cards");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = BoardConfig::from_json(r#"{ "ttl_ms": 1000 }"#).unwrap();
        assert_eq!(config.ttl_ms, 1000);
        assert_eq!(config.key_prefix, "cards");

        let config = BoardConfig::from_json("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(matches!(
            BoardConfig::from_json(r#"{ "ttl_ms": 0 }"#),
            Err(SwimlaneError::ConfigError(_))
        ));
        assert!(matches!(
            BoardConfig::from_json(r#"{ "key_prefix": "  " }"#),
            Err(SwimlaneError::ConfigError(_))
        ));
        assert!(matches!(
            BoardConfig::from_json(r#"{ "placeholder_min_height": -4.0 }"#),
            Err(SwimlaneError::ConfigError(_))
        ));
        assert!(matches!(
            BoardConfig::from_json("not json"),
            Err(SwimlaneError::SerializationError(_))
        ));
    }

    #[test]
    fn test_with_ttl() {
        let config = BoardConfig::default().with_ttl(Duration::from_secs(2));
        assert_eq!(config.ttl_ms, 2000);
    }

    #[test]
    fn test_ttl_beyond_timestamp_range_is_rejected() {
        let raw = format!(r#"{{ "ttl_ms": {} }}"#, u64::MAX);
        assert!(matches!(
            BoardConfig::from_json(&raw),
            Err(SwimlaneError::ConfigError(_))
        ));

        let raw = format!(r#"{{ "ttl_ms": {} }}"#, BoardConfig::MAX_TTL_MS);
        assert!(BoardConfig::from_json(&raw).is_ok());
    }

    #[test]
    fn test_with_ttl_saturates_at_max() {
        let config = BoardConfig::default().with_ttl(Duration::MAX);
        assert_eq!(config.ttl_ms, BoardConfig::MAX_TTL_MS);
        assert!(config.validate().is_ok());
    }
}
