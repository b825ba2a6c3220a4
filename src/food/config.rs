use std::env;
use std::time::Duration;

use crate::config::{ConfigError, CredentialsSource};

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub spoonacular_api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub detail_concurrency: usize,
}

impl FoodConfig {
    pub fn new(spoonacular_api_key: impl Into<String>) -> Self {
        Self {
            spoonacular_api_key: spoonacular_api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
        }
    }

    /// Resolves the API key from the given source, then applies the
    /// optional `SPOONACULAR_*` environment overrides.
    pub fn from_source(source: &CredentialsSource) -> Result<Self, ConfigError> {
        let api_key = source.spoonacular_api_key()?;
        Self::new(api_key).with_env_overrides()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_detail_concurrency(mut self, limit: usize) -> Self {
        self.detail_concurrency = limit.max(1);
        self
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(base_url) = env::var("SPOONACULAR_BASE_URL") {
            url::Url::parse(&base_url)
                .map_err(|e| ConfigError::Invalid(format!("SPOONACULAR_BASE_URL: {}", e)))?;
            self.base_url = base_url;
        }

        if let Ok(secs) = env::var("SPOONACULAR_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SPOONACULAR_TIMEOUT_SECS: '{}'", secs)))?;
            self.timeout = Duration::from_secs(secs);
        }

        if let Ok(limit) = env::var("SPOONACULAR_DETAIL_CONCURRENCY") {
            let limit: usize = limit.parse().map_err(|_| {
                ConfigError::Invalid(format!("SPOONACULAR_DETAIL_CONCURRENCY: '{}'", limit))
            })?;
            self = self.with_detail_concurrency(limit);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FoodConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.detail_concurrency, 4);
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        assert_eq!(FoodConfig::new("key").with_detail_concurrency(0).detail_concurrency, 1);
    }
}
