//! Batch configuration
use landed_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MAX_CONCURRENCY: usize = 64;

/// Fixed-window call budget for the product source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_calls: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Items in flight at once, clamped to `1..=MAX_CONCURRENCY`
    pub concurrency: usize,
    /// Fetch attempts per item, first try included
    pub max_attempts: u32,
    /// Retry delay is `base_delay_ms * 2^attempt`
    pub base_delay_ms: u64,
    /// Whole-item budget: fetch, retries and evaluation
    pub item_timeout_ms: u64,
    /// When false, the first failed item cancels everything not yet started
    pub continue_on_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_attempts: 3,
            base_delay_ms: 500,
            item_timeout_ms: 30_000,
            continue_on_error: true,
            rate_limit: None,
        }
    }
}

impl BatchConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".to_string()));
        }
        if self.item_timeout_ms == 0 {
            return Err(ConfigError::Invalid("item_timeout_ms must be positive".to_string()));
        }
        if let Some(limit) = self.rate_limit {
            if limit.window_ms == 0 {
                return Err(ConfigError::Invalid("rate_limit.window_ms must be positive".to_string()));
            }
        }
        Ok(())
    }

    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Delay before retry number `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = BatchConfig::from_yaml("{}").unwrap();
        assert_eq!(config, BatchConfig::default());
        assert_eq!(config.concurrency, 5);
        assert!(config.continue_on_error);
    }

    #[test]
    fn test_concurrency_clamped() {
        let mut config = BatchConfig { concurrency: 0, ..Default::default() };
        assert_eq!(config.effective_concurrency(), 1);
        config.concurrency = 500;
        assert_eq!(config.effective_concurrency(), MAX_CONCURRENCY);
    }

    #[test]
    fn test_exponential_backoff() {
        let config = BatchConfig::default();
        assert_eq!(config.backoff(0), Duration::from_millis(500));
        assert_eq!(config.backoff(1), Duration::from_millis(1000));
        assert_eq!(config.backoff(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(BatchConfig::from_yaml("max_attempts: 0").is_err());
    }
}
