//! Read-only probes against the auth service
//!
//! - [`HealthProbe`] queries the overall, readiness and liveness endpoints.
//! - [`RateLimitProbe`] fires deliberately failing logins until the
//!   service starts answering HTTP 429.
//!
//! Both return structured reports; printing is left to the caller.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::{Config, ProbeConfig};
use crate::error::{AuthFailure, FailureKind, Result};
use crate::session::{normalize_base_url, SessionClient};

/// Characters of a health response body kept in the report
const BODY_PREVIEW_CHARS: usize = 50;

/// Health endpoints and what they cover
pub const HEALTH_ENDPOINTS: [(&str, &str); 3] = [
    ("/health", "Overall system health"),
    ("/health/ready", "Readiness check (includes database)"),
    ("/health/live", "Liveness check (basic status)"),
];

/// Result of querying one health endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    /// The endpoint answered
    Status {
        /// HTTP status code
        code: u16,
        /// First characters of the response body
        body_preview: String,
    },
    /// The request failed before a response arrived
    Unreachable {
        /// Transport error description
        error: String,
    },
}

/// One health endpoint in a [`HealthReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Endpoint path, e.g. `/health/ready`
    pub endpoint: &'static str,
    /// Human description of the endpoint
    pub description: &'static str,
    /// What happened
    pub outcome: HealthOutcome,
}

impl HealthCheck {
    /// Whether the endpoint answered 200
    pub fn is_healthy(&self) -> bool {
        matches!(self.outcome, HealthOutcome::Status { code: 200, .. })
    }
}

/// Results of a [`HealthProbe`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    /// Checks in probe order
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// True iff every endpoint answered 200
    pub fn all_healthy(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(HealthCheck::is_healthy)
    }
}

/// Queries the service's health endpoints
#[derive(Debug, Clone)]
pub struct HealthProbe {
    http: Client,
    base_url: Url,
}

impl HealthProbe {
    /// Creates a probe with its own timeout
    ///
    /// # Errors
    ///
    /// Returns error if the URL cannot be parsed or the HTTP client cannot
    /// be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(crate::error::AuthGateError::from)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Creates a probe from the `service` configuration section
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.service.base_url, config.service.health_timeout())
    }

    /// Queries every endpoint in [`HEALTH_ENDPOINTS`], one after another
    pub async fn run(&self) -> HealthReport {
        let mut checks = Vec::with_capacity(HEALTH_ENDPOINTS.len());
        for (endpoint, description) in HEALTH_ENDPOINTS {
            let outcome = self.query(endpoint).await;
            match &outcome {
                HealthOutcome::Status { code, .. } => {
                    tracing::debug!(endpoint, code, "Health endpoint answered");
                }
                HealthOutcome::Unreachable { error } => {
                    tracing::warn!(endpoint, error = %error, "Health endpoint unreachable");
                }
            }
            checks.push(HealthCheck {
                endpoint,
                description,
                outcome,
            });
        }
        HealthReport { checks }
    }

    async fn query(&self, endpoint: &str) -> HealthOutcome {
        let url = match self.base_url.join(endpoint.trim_start_matches('/')) {
            Ok(url) => url,
            Err(e) => {
                return HealthOutcome::Unreachable {
                    error: e.to_string(),
                }
            }
        };

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return HealthOutcome::Unreachable {
                    error: AuthFailure::from(e).message().to_string(),
                }
            }
        };

        let code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        HealthOutcome::Status {
            code,
            body_preview: body.chars().take(BODY_PREVIEW_CHARS).collect(),
        }
    }
}

/// One login attempt made by the [`RateLimitProbe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    /// 1-based attempt number
    pub attempt: u32,
    /// Outcome of the login
    pub result: std::result::Result<(), AuthFailure>,
}

impl ProbeAttempt {
    /// Failure kind of the attempt, if it failed
    pub fn kind(&self) -> Option<FailureKind> {
        self.result.as_ref().err().map(AuthFailure::kind)
    }
}

/// Results of a [`RateLimitProbe`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitReport {
    /// Attempts in order; the last one is the 429 when triggered
    pub attempts: Vec<ProbeAttempt>,
}

impl RateLimitReport {
    /// Whether the service answered HTTP 429
    pub fn triggered(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.kind() == Some(FailureKind::RateLimited))
    }
}

/// Fires deliberately failing logins to observe the rate limiter
#[derive(Debug, Clone)]
pub struct RateLimitProbe {
    base_url: String,
    timeout: Duration,
    settings: ProbeConfig,
}

impl RateLimitProbe {
    /// Creates a probe
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the auth service
    /// * `timeout` - Per-request timeout
    /// * `settings` - Attempt budget, pause and credentials
    pub fn new(base_url: impl Into<String>, timeout: Duration, settings: ProbeConfig) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            settings,
        }
    }

    /// Creates a probe from configuration, using the probe's own timeout
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.service.base_url.clone(),
            config.probe.timeout(),
            config.probe.clone(),
        )
    }

    /// Logs in repeatedly through a fresh session until rate limited
    ///
    /// Stops at the first HTTP 429 or after the configured number of
    /// attempts, pausing between attempts. Connection failures are
    /// recorded and do not stop the probe.
    ///
    /// # Errors
    ///
    /// Returns error only if the session client cannot be constructed
    pub async fn run(&self) -> Result<RateLimitReport> {
        let mut session = SessionClient::new(&self.base_url, self.timeout)?;
        let mut report = RateLimitReport::default();

        for attempt in 1..=self.settings.attempts {
            let result = session
                .login(&self.settings.username, &self.settings.password)
                .await;
            session.logout();

            let limited = matches!(&result, Err(AuthFailure::RateLimited(_)));
            tracing::debug!(attempt, limited, "Rate limit probe attempt");
            report.attempts.push(ProbeAttempt { attempt, result });

            if limited {
                tracing::info!(attempt, "Rate limiting triggered");
                break;
            }

            if attempt < self.settings.attempts && !self.settings.delay().is_zero() {
                tokio::time::sleep(self.settings.delay()).await;
            }
        }

        Ok(report)
    }
}
