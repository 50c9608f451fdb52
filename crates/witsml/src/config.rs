// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client configuration.
//!
//! ```yaml
//! server:
//!   id: rig-7
//!   url: https://store.example.com/witsml/store
//!   username: reader
//!   password: change-me
//! client:
//!   name: drilling-monitor
//!   schema_versions: ["1.4.1.1", "1.3.1.1"]
//! request_timeout: 30s
//! retry:
//!   max_retries: 3
//!   initial_delay: 200ms
//! pagination:
//!   max_rows_per_request: 1000
//! option_extensions: [requestObjectSelectionCapability]
//! ```
//!
//! Files are YAML or TOML, parsed through the `config` crate. After parsing,
//! `WITSML_*` environment variables override individual fields:
//!
//! ```text
//! WITSML_SERVER_URL=https://other.example.com/witsml/store
//! WITSML_SERVER_USERNAME=reader
//! WITSML_SERVER_PASSWORD=...
//! WITSML_REQUEST_TIMEOUT=45s
//! WITSML_RETRY_MAX_RETRIES=5
//! WITSML_PAGINATION_MAX_ROWS_PER_REQUEST=500
//! WITSML_LOG_LEVEL=debug
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{ExponentialBackoff, RetryConfig, RetryStrategy};
use crate::error::{ConfigurationError, WitsmlResult};
use crate::logging::LogFormat;
use crate::profile::ServerProfile;

// =============================================================================
// ClientConfig
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Store to talk to.
    pub server: ServerProfile,

    /// Identity announced in `capClient`.
    #[serde(default)]
    pub client: ClientIdentity,

    /// Per-call deadline.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// TCP connect timeout.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Retry of read-only calls.
    #[serde(default)]
    pub retry: RetrySettings,

    /// Growing-object reads.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Server-specific `OptionsIn` keys passed through verbatim.
    #[serde(default)]
    pub option_extensions: Vec<String>,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

impl ClientConfig {
    /// Creates a configuration with defaults for a server.
    pub fn new(server: ServerProfile) -> Self {
        Self {
            server,
            client: ClientIdentity::default(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            retry: RetrySettings::default(),
            pagination: PaginationConfig::default(),
            option_extensions: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }

    /// Creates a builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates every section.
    pub fn validate(&self) -> WitsmlResult<()> {
        self.server.validate()?;
        self.client.validate()?;
        if self.request_timeout.is_zero() {
            return Err(ConfigurationError::invalid_value("request_timeout", "must be greater than 0").into());
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigurationError::invalid_value("connect_timeout", "must be greater than 0").into());
        }
        self.retry.validate()?;
        self.pagination.validate()?;
        for key in &self.option_extensions {
            if key.is_empty() || key.contains(['=', ';']) {
                return Err(ConfigurationError::invalid_value(
                    "option_extensions",
                    format!("'{}' is not a valid option key", key),
                )
                .into());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Client identity announced to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Application name.
    #[serde(default = "default_client_name")]
    pub name: String,
    /// Free-text description.
    #[serde(default = "default_client_description")]
    pub description: String,
    /// Vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Supported data schema versions, most preferred first.
    #[serde(default = "default_schema_versions")]
    pub schema_versions: Vec<String>,
}

fn default_client_name() -> String {
    crate::NAME.to_string()
}

fn default_client_description() -> String {
    "WITSML Store API client".to_string()
}

fn default_schema_versions() -> Vec<String> {
    vec!["1.4.1.1".to_string(), "1.3.1.1".to_string()]
}

impl ClientIdentity {
    fn validate(&self) -> WitsmlResult<()> {
        if self.name.is_empty() {
            return Err(ConfigurationError::missing_field("client.name").into());
        }
        if self.schema_versions.is_empty() {
            return Err(ConfigurationError::invalid_value(
                "client.schema_versions",
                "at least one version is required",
            )
            .into());
        }
        Ok(())
    }
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            description: default_client_description(),
            vendor: None,
            schema_versions: default_schema_versions(),
        }
    }
}

/// Retry of read-only calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry.
    #[serde(default = "default_initial_delay", with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Delay cap.
    #[serde(default = "default_max_delay", with = "humantime_serde")]
    pub max_delay: Duration,
    /// Growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Jitter factor (0.0 - 1.0).
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(200)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

impl RetrySettings {
    /// Converts into the executor's retry configuration.
    pub fn to_retry_config(&self) -> RetryConfig {
        let backoff = ExponentialBackoff::new(self.initial_delay, self.max_delay)
            .with_multiplier(self.multiplier)
            .with_jitter(self.jitter);
        RetryConfig::new(self.max_retries).with_strategy(RetryStrategy::Exponential(backoff))
    }

    fn validate(&self) -> WitsmlResult<()> {
        if self.multiplier < 1.0 {
            return Err(ConfigurationError::invalid_value("retry.multiplier", "must be at least 1.0").into());
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigurationError::invalid_value("retry.jitter", "must be within 0.0..=1.0").into());
        }
        if self.initial_delay > self.max_delay {
            return Err(ConfigurationError::invalid_value(
                "retry.initial_delay",
                "must not exceed retry.max_delay",
            )
            .into());
        }
        Ok(())
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

/// Growing-object read bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows per data read before clamping to the server's `maxDataNodes`.
    #[serde(default = "default_max_rows_per_request")]
    pub max_rows_per_request: u32,
    /// Row bound of a materialised read.
    #[serde(default = "default_max_total_rows")]
    pub max_total_rows: u64,
    /// Byte bound of a materialised read.
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

fn default_max_rows_per_request() -> u32 {
    1000
}

fn default_max_total_rows() -> u64 {
    1_000_000
}

fn default_max_total_bytes() -> u64 {
    256 * 1024 * 1024
}

impl PaginationConfig {
    fn validate(&self) -> WitsmlResult<()> {
        if self.max_rows_per_request == 0 {
            return Err(ConfigurationError::invalid_value(
                "pagination.max_rows_per_request",
                "must be greater than 0",
            )
            .into());
        }
        if self.max_total_rows == 0 || self.max_total_bytes == 0 {
            return Err(ConfigurationError::invalid_value(
                "pagination",
                "total bounds must be greater than 0",
            )
            .into());
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_rows_per_request: default_max_rows_per_request(),
            max_total_rows: default_max_total_rows(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level directive (`info`, `witsml=debug` ...).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// =============================================================================
// ClientConfigBuilder
// =============================================================================

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    server: Option<ServerProfile>,
    client: Option<ClientIdentity>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetrySettings>,
    pagination: Option<PaginationConfig>,
    option_extensions: Vec<String>,
    logging: Option<LoggingConfig>,
}

impl ClientConfigBuilder {
    /// Sets the server profile.
    pub fn server(mut self, server: ServerProfile) -> Self {
        self.server = Some(server);
        self
    }

    /// Sets the client identity.
    pub fn client(mut self, client: ClientIdentity) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the supported schema versions, most preferred first.
    pub fn schema_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut client = self.client.take().unwrap_or_default();
        client.schema_versions = versions.into_iter().map(Into::into).collect();
        self.client = Some(client);
        self
    }

    /// Sets the per-call deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry settings.
    pub fn retry(mut self, retry: RetrySettings) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the pagination bounds.
    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Adds a server-specific option key.
    pub fn option_extension(mut self, key: impl Into<String>) -> Self {
        self.option_extensions.push(key.into());
        self
    }

    /// Sets the logging section.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> WitsmlResult<ClientConfig> {
        let server = self
            .server
            .ok_or_else(|| ConfigurationError::missing_field("server"))?;
        let config = ClientConfig {
            server,
            client: self.client.unwrap_or_default(),
            request_timeout: self.request_timeout.unwrap_or_else(default_request_timeout),
            connect_timeout: self.connect_timeout.unwrap_or_else(default_connect_timeout),
            retry: self.retry.unwrap_or_default(),
            pagination: self.pagination.unwrap_or_default(),
            option_extensions: self.option_extensions,
            logging: self.logging.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML.
    Yaml,
    /// TOML.
    Toml,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> WitsmlResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigurationError::load(
                path.display().to_string(),
                format!("unsupported extension {:?}", other.unwrap_or("")),
            )
            .into()),
        }
    }

    fn file_format(self) -> config::FileFormat {
        match self {
            Self::Yaml => config::FileFormat::Yaml,
            Self::Toml => config::FileFormat::Toml,
        }
    }
}

/// Loads [`ClientConfig`] from files or strings.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    apply_env: bool,
}

impl ConfigLoader {
    /// Creates a loader with the `WITSML` prefix.
    pub fn new() -> Self {
        Self {
            env_prefix: "WITSML".to_string(),
            apply_env: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment overrides.
    pub fn with_env_overrides(mut self, enabled: bool) -> Self {
        self.apply_env = enabled;
        self
    }

    /// Loads and validates a configuration file.
    pub fn load(&self, path: impl AsRef<Path>) -> WitsmlResult<ClientConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading WITSML client configuration");

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigurationError::load(path.display().to_string(), e))?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self
            .parse(&content, format)
            .map_err(|e| ConfigurationError::load(path.display().to_string(), e))?;

        if self.apply_env {
            self.apply_env_overrides(&mut config)?;
        }
        config.validate()?;

        debug!(
            server = %config.server.url,
            versions = ?config.client.schema_versions,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parses and validates configuration content.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> WitsmlResult<ClientConfig> {
        let mut config = self
            .parse(content, format)
            .map_err(|e| ConfigurationError::load("<string>", e))?;
        if self.apply_env {
            self.apply_env_overrides(&mut config)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn parse(&self, content: &str, format: ConfigFormat) -> Result<ClientConfig, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(content, format.file_format()))
            .build()?
            .try_deserialize()
    }

    /// Applies `<PREFIX>_*` environment overrides.
    pub fn apply_env_overrides(&self, config: &mut ClientConfig) -> WitsmlResult<()> {
        let var = |name: &str| env::var(format!("{}_{}", self.env_prefix, name)).ok();

        if let Some(value) = var("SERVER_URL") {
            config.server.url = value;
        }
        if let Some(value) = var("SERVER_USERNAME") {
            config.server.username = Some(value);
        }
        if let Some(value) = var("SERVER_PASSWORD") {
            config.server.password = Some(value);
        }
        if let Some(value) = var("REQUEST_TIMEOUT") {
            config.request_timeout = self.parse_duration("REQUEST_TIMEOUT", &value)?;
        }
        if let Some(value) = var("CONNECT_TIMEOUT") {
            config.connect_timeout = self.parse_duration("CONNECT_TIMEOUT", &value)?;
        }
        if let Some(value) = var("RETRY_MAX_RETRIES") {
            config.retry.max_retries = self.parse_number("RETRY_MAX_RETRIES", &value)?;
        }
        if let Some(value) = var("PAGINATION_MAX_ROWS_PER_REQUEST") {
            config.pagination.max_rows_per_request =
                self.parse_number("PAGINATION_MAX_ROWS_PER_REQUEST", &value)?;
        }
        if let Some(value) = var("LOG_LEVEL") {
            config.logging.level = value;
        }
        Ok(())
    }

    fn parse_duration(&self, name: &str, value: &str) -> WitsmlResult<Duration> {
        humantime::parse_duration(value).map_err(|e| {
            ConfigurationError::invalid_value(format!("{}_{}", self.env_prefix, name), e.to_string())
                .into()
        })
    }

    fn parse_number<N: std::str::FromStr>(&self, name: &str, value: &str) -> WitsmlResult<N> {
        value.trim().parse().map_err(|_| {
            ConfigurationError::invalid_value(
                format!("{}_{}", self.env_prefix, name),
                format!("'{}' is not a valid number", value),
            )
            .into()
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads a configuration file with the default loader.
pub fn load_config(path: impl AsRef<Path>) -> WitsmlResult<ClientConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================
