//! Configuration management
//!
//! `ClientConfig` is built in code with `with_*` methods. The CLI can also load
//! a JSON file and pick up the API key from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::error::{ClientError, ClientResult};

/// Production API host
pub const PRODUCTION_BASE_URL: &str = "https://pro-api.coinmarketcap.com";

/// Sandbox API host
pub const SANDBOX_BASE_URL: &str = "https://sandbox-api.coinmarketcap.com";

/// Lookback window used when the tier name is not recognized
pub const DEFAULT_LOOKBACK_DAYS: u32 = 29;

pub const DEFAULT_VERSION: &str = "v1";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = 5;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "CMC_PRO_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn from_sandbox_flag(is_sandbox: bool) -> Self {
        if is_sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Account plan. Decides how far back historical endpoints may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTier {
    Standard,
    Professional,
}

impl ApiTier {
    /// Maximum history the plan allows, in days
    pub fn max_history_days(&self) -> u32 {
        match self {
            ApiTier::Standard => 30,
            ApiTier::Professional => 365,
        }
    }

    /// One day short of the maximum so the boundary day never gets rejected
    pub fn lookback_days(&self) -> u32 {
        self.max_history_days() - 1
    }
}

impl FromStr for ApiTier {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ApiTier::Standard),
            "professional" => Ok(ApiTier::Professional),
            _ => Err(ClientError::Config(format!(
                "Unknown API tier: {}. Use 'standard' or 'professional'",
                s
            ))),
        }
    }
}

impl fmt::Display for ApiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiTier::Standard => write!(f, "standard"),
            ApiTier::Professional => write!(f, "professional"),
        }
    }
}

/// Lookback window for a tier name; unknown names fall back to 29 days
pub fn resolve_lookback_days(tier: &str) -> u32 {
    match tier.parse::<ApiTier>() {
        Ok(t) => t.lookback_days(),
        Err(_) => {
            warn!(
                "Unrecognized API tier '{}', using default lookback of {} days",
                tier, DEFAULT_LOOKBACK_DAYS
            );
            DEFAULT_LOOKBACK_DAYS
        }
    }
}

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Sent as `X-CMC_PRO_API_KEY`
    pub api_key: String,
    pub environment: Environment,
    pub tier: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Path segment after the host, e.g. `v1`
    pub version: String,
    /// Extra attempts after the first non-200 response
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_backoff: Duration,
    /// Host override (proxies, mock servers); takes precedence over `environment`
    pub base_url: Option<String>,
}

// Hand-written so the key never reaches logs
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("tier", &self.tier)
            .field("timeout", &self.timeout)
            .field("version", &self.version)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            environment: Environment::Sandbox,
            tier: ApiTier::Standard.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            version: DEFAULT_VERSION.to_string(),
            max_retries: 1,
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
            base_url: None,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_sandbox(self, is_sandbox: bool) -> Self {
        self.with_environment(Environment::from_sandbox_flag(is_sandbox))
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or_else(|| self.environment.base_url())
    }

    /// `{base}/{version}`, e.g. `https://sandbox-api.coinmarketcap.com/v1`
    pub fn versioned_url(&self) -> String {
        format!("{}/{}", self.base_url(), self.version)
    }

    pub fn lookback_days(&self) -> u32 {
        resolve_lookback_days(&self.tier)
    }
}

/// On-disk configuration (JSON). Durations are in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff_secs: Option<u64>,
}

impl FileConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Take the API key from the environment if the file did not set one
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.is_none() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.api_key = Some(key);
            }
        }
        self
    }

    pub fn into_client_config(self) -> ClientResult<ClientConfig> {
        let api_key = self.api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            ClientError::Config(format!(
                "API key missing: set it in the config file or {}",
                API_KEY_ENV
            ))
        })?;

        let mut config = ClientConfig::new(api_key).with_environment(self.environment);
        if let Some(tier) = self.tier {
            config = config.with_tier(tier);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(version) = self.version {
            config = config.with_version(version);
        }
        if let Some(retries) = self.max_retries {
            config = config.with_max_retries(retries);
        }
        if let Some(secs) = self.retry_backoff_secs {
            config = config.with_retry_backoff(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
