//! Configuration management for authgate
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AuthGateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for authgate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Auth service connection settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Rate-limit probe settings
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Integration showcase settings
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Auth service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the auth service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for auth calls (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Timeout for health endpoint probes (seconds)
    #[serde(default = "default_health_timeout_seconds")]
    pub health_timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:5281".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_health_timeout_seconds() -> u64 {
    5
}

impl ServiceConfig {
    /// Timeout applied to login, validate and who-am-i calls
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Timeout applied to health probes
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            health_timeout_seconds: default_health_timeout_seconds(),
        }
    }
}

/// Rate-limit probe configuration
///
/// The probe logs in with deliberately wrong credentials until the
/// service answers HTTP 429 or the attempt budget runs out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of login attempts
    #[serde(default = "default_probe_attempts")]
    pub attempts: u32,

    /// Pause between attempts (milliseconds)
    #[serde(default = "default_probe_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout for probe logins (seconds)
    #[serde(default = "default_probe_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Username sent by the probe
    #[serde(default = "default_probe_username")]
    pub username: String,

    /// Password sent by the probe
    #[serde(default = "default_probe_password")]
    pub password: String,
}

fn default_probe_attempts() -> u32 {
    6
}

fn default_probe_delay_ms() -> u64 {
    500
}

fn default_probe_timeout_seconds() -> u64 {
    5
}

fn default_probe_username() -> String {
    "test".to_string()
}

fn default_probe_password() -> String {
    "wrong".to_string()
}

impl ProbeConfig {
    /// Pause between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Request timeout for probe logins
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: default_probe_attempts(),
            delay_ms: default_probe_delay_ms(),
            timeout_seconds: default_probe_timeout_seconds(),
            username: default_probe_username(),
            password: default_probe_password(),
        }
    }
}

/// Integration showcase configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Account used for the successful login scenario
    #[serde(default = "default_demo_username")]
    pub username: String,

    /// Password for the successful login scenario
    #[serde(default = "default_demo_password")]
    pub password: String,

    /// Simulated payment gateway latency (milliseconds)
    #[serde(default = "default_payment_delay_ms")]
    pub payment_delay_ms: u64,
}

fn default_demo_username() -> String {
    "admin".to_string()
}

fn default_demo_password() -> String {
    "admin".to_string()
}

fn default_payment_delay_ms() -> u64 {
    1000
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            username: default_demo_username(),
            password: default_demo_password(),
            payment_delay_ms: default_payment_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AuthGateError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AuthGateError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("AUTHGATE_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: AUTHGATE_BASE_URL");
            self.service.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("AUTHGATE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.service.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid AUTHGATE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(timeout) = std::env::var("AUTHGATE_HEALTH_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.service.health_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid AUTHGATE_HEALTH_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(attempts) = std::env::var("AUTHGATE_PROBE_ATTEMPTS") {
            if let Ok(value) = attempts.parse() {
                self.probe.attempts = value;
            } else {
                tracing::warn!("Invalid AUTHGATE_PROBE_ATTEMPTS: {}", attempts);
            }
        }

        if let Ok(delay) = std::env::var("AUTHGATE_PROBE_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.probe.delay_ms = value;
            } else {
                tracing::warn!("Invalid AUTHGATE_PROBE_DELAY_MS: {}", delay);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            tracing::debug!(base_url = %base_url, "CLI override: --base-url");
            self.service.base_url = base_url.clone();
        }

        if let Some(timeout) = cli.timeout {
            tracing::debug!(timeout, "CLI override: --timeout");
            self.service.timeout_seconds = timeout;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is unusable or a numeric setting is
    /// outside its accepted range
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.service.base_url).map_err(|e| {
            AuthGateError::Config(format!(
                "service.base_url is not a valid URL ({}): {}",
                self.service.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthGateError::Config(format!(
                "service.base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.service.timeout_seconds == 0 || self.service.timeout_seconds > 60 {
            return Err(AuthGateError::Config(
                "service.timeout_seconds must be between 1 and 60".to_string(),
            )
            .into());
        }

        if self.service.health_timeout_seconds == 0 || self.service.health_timeout_seconds > 60 {
            return Err(AuthGateError::Config(
                "service.health_timeout_seconds must be between 1 and 60".to_string(),
            )
            .into());
        }

        if self.probe.timeout_seconds == 0 || self.probe.timeout_seconds > 60 {
            return Err(AuthGateError::Config(
                "probe.timeout_seconds must be between 1 and 60".to_string(),
            )
            .into());
        }

        if self.probe.attempts == 0 {
            return Err(
                AuthGateError::Config("probe.attempts must be greater than 0".to_string()).into(),
            );
        }

        if self.probe.attempts > 100 {
            return Err(AuthGateError::Config(
                "probe.attempts must be less than or equal to 100".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            probe: ProbeConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}
