//! Immutable gateway configuration resolved once at process start.
//!
//! ```rust
//! use palaver::GatewayConfig;
//!
//! let config = GatewayConfig::new("sk-test")
//!     .with_model("gpt-4o-mini")
//!     .with_max_retries(2);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.model, "gpt-4o-mini");
//! assert_eq!(format!("{:?}", config.api_key), "[REDACTED]");
//! ```

use std::time::Duration;

use crate::{GatewayError, GatewayErrorKind};

/// Secret wrapper that never leaks its value through `Debug` output and
/// zeroes the backing storage on drop.
#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Process-wide settings for one upstream endpoint.
///
/// Constructed once at startup, shared as `Arc<GatewayConfig>` across all
/// concurrent calls, never mutated afterwards.
#[derive(Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overall deadline per transport call, connection through full body or
    /// stream consumption.
    pub timeout: Duration,
    pub enable_stream: bool,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: SecretString::new(api_key),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            enable_stream: true,
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_streaming(mut self, enable_stream: bool) -> Self {
        self.enable_stream = enable_stream;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Resolves configuration from `PALAVER_*` environment variables.
    ///
    /// `PALAVER_API_KEY` is required; every other variable falls back to the
    /// defaults of [`GatewayConfig::new`].
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same resolution policy as [`GatewayConfig::from_env`], with the
    /// variable lookup injected.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GatewayError> {
        let api_key = lookup("PALAVER_API_KEY")
            .ok_or_else(|| GatewayError::invalid_request("PALAVER_API_KEY is not set"))?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup("PALAVER_BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(model) = lookup("PALAVER_MODEL") {
            config.model = model;
        }

        if let Some(max_tokens) = lookup("PALAVER_MAX_TOKENS") {
            config.max_tokens = parse_var("PALAVER_MAX_TOKENS", &max_tokens)?;
        }

        if let Some(temperature) = lookup("PALAVER_TEMPERATURE") {
            config.temperature = parse_var("PALAVER_TEMPERATURE", &temperature)?;
        }

        if let Some(timeout_ms) = lookup("PALAVER_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(parse_var("PALAVER_TIMEOUT_MS", &timeout_ms)?);
        }

        if let Some(enable_stream) = lookup("PALAVER_ENABLE_STREAM") {
            config.enable_stream = parse_var("PALAVER_ENABLE_STREAM", &enable_stream)?;
        }

        if let Some(max_retries) = lookup("PALAVER_MAX_RETRIES") {
            config.max_retries = parse_var("PALAVER_MAX_RETRIES", &max_retries)?;
        }

        if let Some(retry_delay_ms) = lookup("PALAVER_RETRY_DELAY_MS") {
            config.retry_delay =
                Duration::from_millis(parse_var("PALAVER_RETRY_DELAY_MS", &retry_delay_ms)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::invalid_request("base_url must not be empty"));
        }

        if self.api_key.is_empty() {
            return Err(GatewayError::invalid_request("api_key must not be empty"));
        }

        if self.model.trim().is_empty() {
            return Err(GatewayError::invalid_request("model must not be empty"));
        }

        if self.max_tokens == 0 {
            return Err(GatewayError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GatewayError::new(
                GatewayErrorKind::InvalidRequest,
                "temperature must be in the inclusive range 0.0..=2.0",
                false,
            ));
        }

        if self.timeout.is_zero() {
            return Err(GatewayError::invalid_request(
                "timeout must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, GatewayError> {
    raw.trim()
        .parse()
        .map_err(|_| GatewayError::invalid_request(format!("{key} has an invalid value: {raw}")))
}
