use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";

#[derive(Debug, Clone, Deserialize)]
pub struct BackdropConfig {
    pub interval: Duration,
    pub fade: Duration,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            fade: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Fail authenticated calls locally when no token is held instead of
    /// letting the backend answer them.
    pub strict_auth: bool,
    pub backdrop: BackdropConfig,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let request_timeout = Duration::from_secs(
            std::env::var("API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );
        let strict_auth = std::env::var("STRICT_AUTH")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let backdrop = BackdropConfig {
            interval: Duration::from_secs(
                std::env::var("BACKDROP_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(5),
            ),
            fade: Duration::from_millis(
                std::env::var("BACKDROP_FADE_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1000),
            ),
        };

        let config = Self {
            api_base_url,
            request_timeout,
            strict_auth,
            backdrop,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn for_base_url(url: impl Into<String>) -> Self {
        Self {
            api_base_url: url.into(),
            request_timeout: Duration::from_secs(30),
            strict_auth: false,
            backdrop: BackdropConfig::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("API_BASE_URL is not a valid URL: {}", self.api_base_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "API_BASE_URL must use http or https, got {}",
            url.scheme()
        );
        anyhow::ensure!(
            !self.backdrop.interval.is_zero(),
            "BACKDROP_INTERVAL_SECS must be greater than zero"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_base_url_uses_defaults() {
        let config = ClientConfig::for_base_url("http://127.0.0.1:9000");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert!(!config.strict_auth);
        assert_eq!(config.backdrop.interval, Duration::from_secs(5));
        assert_eq!(config.backdrop.fade, Duration::from_millis(1000));
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let err = ClientConfig::for_base_url("ftp://example.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));

        assert!(ClientConfig::for_base_url("not a url").validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_backdrop_interval() {
        let mut config = ClientConfig::for_base_url(DEFAULT_API_BASE_URL);
        config.backdrop.interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
