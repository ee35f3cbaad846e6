//! Facade configuration.
//!
//! A [`FacadeConfig`] carries the provider credential plus the connection settings of the
//! HTTP client. It can be built in code, parsed from TOML, or read from the environment.
//!
//! ```toml
//! api_key = "sk_test_..."
//! api_base = "https://api.stripe.com"
//! api_version = "2024-06-20"
//!
//! [http]
//! pool_max_idle_per_host = 20
//! timeout_secs = 60
//! connect_timeout_secs = 10
//! ```

use std::{path::Path, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::{FacadeError, Result};

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Environment variable holding the secret API key.
pub const ENV_SECRET_KEY: &str = "STRIPE_SECRET_KEY";

/// Environment variable overriding the API base URL.
pub const ENV_API_BASE: &str = "STRIPE_API_BASE";

/// Environment variable pinning the API version.
pub const ENV_API_VERSION: &str = "STRIPE_API_VERSION";

/// Root facade configuration.
///
/// The secret key is never printed by `Debug`.
#[derive(Debug, Deserialize)]
pub struct FacadeConfig {
    /// Secret API key sent as a bearer token on every request.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,

    /// Base URL of the provider API, without the `/v1` prefix.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API version to pin via the `Stripe-Version` header. The account default is used
    /// when unset.
    #[serde(default)]
    pub api_version: Option<String>,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl FacadeConfig {
    /// Creates a configuration with the given key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            api_base: default_api_base(),
            api_version: None,
            http: HttpConfig::default(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Pins the API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Replaces the HTTP client settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`] if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| FacadeError::Config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`] if the file cannot be read or is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FacadeError::Config(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Builds a configuration from process environment variables.
    ///
    /// Reads [`ENV_SECRET_KEY`] (required), [`ENV_API_BASE`] and [`ENV_API_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`] if the key is missing or the result is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`] if the key is missing or the result is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_SECRET_KEY).ok_or_else(|| {
            FacadeError::Config(format!("environment variable {ENV_SECRET_KEY} is not set"))
        })?;

        let mut config = Self::new(api_key);
        if let Some(api_base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            config.api_base = api_base;
        }
        config.api_version = lookup(ENV_API_VERSION).filter(|v| !v.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// The key itself is not checked; a rejected key surfaces on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`] if:
    /// - `api_base` is not a valid URL, or uses plain HTTP for a non-loopback host
    /// - `api_version` is set but blank
    /// - HTTP timeouts are out of range
    pub fn validate(&self) -> Result<()> {
        validate_api_base(&self.api_base)?;

        if self.api_version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(FacadeError::Config("api_version cannot be blank".to_owned()));
        }

        self.http.validate()
    }

    /// Returns a copy of the secret key.
    pub(crate) fn secret(&self) -> SecretString {
        SecretString::from(self.api_key.expose_secret())
    }
}

/// Checks that the base URL is HTTPS, or HTTP on a loopback host.
fn validate_api_base(api_base: &str) -> Result<()> {
    let url = Url::parse(api_base)
        .map_err(|e| FacadeError::Config(format!("invalid api_base '{api_base}': {e}")))?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback(&url) => {}
        scheme => {
            return Err(FacadeError::Config(format!(
                "api_base must use HTTPS, got: {scheme}"
            )));
        }
    }

    if url.host_str().is_none() {
        return Err(FacadeError::Config(format!("api_base missing host: {api_base}")));
    }

    Ok(())
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(host)) => host.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_owned()
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Maximum idle connections per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Validates configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns error if timeout values are outside valid ranges:
    /// - `timeout_secs`: must be 1-300 seconds
    /// - `connect_timeout_secs`: must be 1-60 seconds
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(FacadeError::Config("timeout_secs must be between 1 and 300".to_owned()));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(FacadeError::Config(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_pool_max_idle() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
