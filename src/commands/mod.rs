/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `demo`       - Legacy ERP integration showcase
- `suite`      - Auth API security test suite
- `login`      - Log in and show the session
- `check`      - Log in and check permissions
- `health`     - Probe the health endpoints
- `rate_limit` - Probe the login rate limiter

Handlers own all printing. They drive the session client, the
authorization gate and the probes, and format the structured results
those return.
*/

use crate::config::Config;
use crate::console::{advice, print_step, Status};
use crate::error::{AuthFailure, FailureKind, Result};
use crate::session::{token_preview, SessionClient};

// Integration showcase
pub mod demo;

// Security test suite
pub mod suite;

/// Logs in and narrates the outcome
///
/// Returns `true` when the session is now authenticated.
pub async fn narrate_login(session: &mut SessionClient, username: &str, password: &str) -> bool {
    print_step(&format!("Attempting login for user: {}", username), Status::Info);

    match session.login(username, password).await {
        Ok(()) => {
            if let Some(token) = session.token() {
                print_step(
                    &format!(
                        "Login successful! Token obtained (first 20 chars): {}",
                        token_preview(token)
                    ),
                    Status::Success,
                );
            }
            match session.current_user() {
                Some(user) => print_step(&describe_user(user), Status::Success),
                None => print_step("Failed to get user info", Status::Error),
            }
            true
        }
        Err(failure) => {
            print_step(&describe_login_failure(&failure), login_failure_status(&failure));
            false
        }
    }
}

/// One-line description of a user snapshot
pub fn describe_user(user: &crate::session::UserSnapshot) -> String {
    format!(
        "Current user: {} (ID: {}, Role: {})",
        user.username.as_deref().unwrap_or("-"),
        user.user_id.as_deref().unwrap_or("-"),
        user.role.as_deref().unwrap_or("-")
    )
}

/// Human description of a failed login
pub fn describe_login_failure(failure: &AuthFailure) -> String {
    match failure.kind() {
        FailureKind::RateLimited => {
            "Login blocked: Rate limit exceeded (security protection)".to_string()
        }
        FailureKind::ServiceUnavailable => {
            format!("Failed to reach Auth API: {}", failure.message())
        }
        _ => format!("Login failed: {}", failure.message()),
    }
}

fn login_failure_status(failure: &AuthFailure) -> Status {
    if failure.kind() == FailureKind::RateLimited {
        Status::Warning
    } else {
        Status::Error
    }
}

// Ad-hoc login
pub mod login {
    //! `authgate login`: authenticate and show the resulting session.

    use super::*;
    use crate::session::UserSnapshot;
    use serde::Serialize;

    /// JSON view of a session; never includes the full token
    #[derive(Debug, Serialize)]
    pub struct SessionView<'a> {
        /// Whether the session is authenticated
        pub authenticated: bool,
        /// Loggable token prefix
        pub token_preview: Option<String>,
        /// User snapshot, if loaded
        pub user: Option<&'a UserSnapshot>,
    }

    impl<'a> SessionView<'a> {
        /// Builds the view from a session
        pub fn from_session(session: &'a SessionClient) -> Self {
            Self {
                authenticated: session.is_authenticated(),
                token_preview: session.token().map(token_preview),
                user: session.current_user(),
            }
        }
    }

    /// Logs in and prints the session
    ///
    /// # Errors
    ///
    /// Returns error if the login fails; the message names the failure kind
    pub async fn run_login(
        config: &Config,
        username: &str,
        password: &str,
        json: bool,
    ) -> Result<()> {
        let mut session = SessionClient::from_config(&config.service)?;

        if json {
            if let Err(failure) = session.login(username, password).await {
                anyhow::bail!("login failed [{}]: {}", failure.kind(), failure.message());
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&SessionView::from_session(&session))?
            );
            return Ok(());
        }

        if !narrate_login(&mut session, username, password).await {
            anyhow::bail!("login failed for user {}", username);
        }
        Ok(())
    }
}

// Permission checks
pub mod check {
    //! `authgate check`: authenticate, then run each permission through the
    //! authorization gate.

    use super::*;
    use crate::gate::AuthorizationGate;

    /// Logs in and checks every permission in order
    ///
    /// # Errors
    ///
    /// Returns error if the login fails or any permission is denied
    pub async fn run_check(
        config: &Config,
        username: &str,
        password: &str,
        permissions: &[String],
    ) -> Result<()> {
        let session = SessionClient::from_config(&config.service)?;
        let mut gate = AuthorizationGate::new(session);

        if !narrate_login(gate.session_mut(), username, password).await {
            anyhow::bail!("login failed for user {}", username);
        }

        let mut denied = 0usize;
        for permission in permissions {
            match gate.check(permission).await {
                Ok(grant) => print_step(
                    &format!(
                        "Permission check: '{}' for role '{}' = true",
                        grant.permission, grant.role
                    ),
                    Status::Success,
                ),
                Err(denial) => {
                    denied += 1;
                    print_step(
                        &format!(
                            "{} [{}] - {}",
                            denial,
                            denial.reason(),
                            advice(denial.kind())
                        ),
                        Status::Warning,
                    );
                }
            }
        }

        if denied > 0 {
            anyhow::bail!(
                "{} of {} permission checks denied",
                denied,
                permissions.len()
            );
        }
        Ok(())
    }
}

// Health probe
pub mod health {
    //! `authgate health`: query the health endpoints.

    use super::*;
    use crate::probe::{HealthOutcome, HealthProbe, HealthReport};

    /// Prints one line per health endpoint
    pub fn print_health_report(report: &HealthReport) {
        for check in &report.checks {
            match &check.outcome {
                HealthOutcome::Status { code, .. } => print_step(
                    &format!("{} - {}: HTTP {}", check.endpoint, check.description, code),
                    if check.is_healthy() {
                        Status::Success
                    } else {
                        Status::Error
                    },
                ),
                HealthOutcome::Unreachable { error } => print_step(
                    &format!("{} - Failed to connect: {}", check.endpoint, error),
                    Status::Error,
                ),
            }
        }
    }

    /// Probes and prints the health endpoints
    ///
    /// # Errors
    ///
    /// Returns error if any endpoint is unhealthy
    pub async fn run_health(config: &Config) -> Result<()> {
        let probe = HealthProbe::from_config(config)?;
        let report = probe.run().await;
        print_health_report(&report);

        if !report.all_healthy() {
            anyhow::bail!("auth service is not healthy");
        }
        Ok(())
    }
}

// Rate-limit probe
pub mod rate_limit {
    //! `authgate rate-limit`: hammer the login endpoint until HTTP 429.

    use super::*;
    use crate::probe::{RateLimitProbe, RateLimitReport};

    /// Prints one line per attempt and a verdict when nothing triggered
    pub fn print_rate_limit_report(report: &RateLimitReport) {
        for attempt in &report.attempts {
            match &attempt.result {
                Err(AuthFailure::RateLimited(_)) => print_step(
                    &format!(
                        "Attempt {}: Rate limited (HTTP 429) - Security protection working!",
                        attempt.attempt
                    ),
                    Status::Warning,
                ),
                Err(AuthFailure::ServiceUnavailable(message)) => print_step(
                    &format!("Attempt {}: Connection failed: {}", attempt.attempt, message),
                    Status::Error,
                ),
                Err(failure) => print_step(
                    &format!(
                        "Attempt {}: {} (within rate limit)",
                        attempt.attempt,
                        failure.kind()
                    ),
                    Status::Info,
                ),
                Ok(()) => print_step(
                    &format!("Attempt {}: login accepted (within rate limit)", attempt.attempt),
                    Status::Info,
                ),
            }
        }

        if !report.triggered() {
            print_step(
                "Rate limit not triggered - may need more requests or a shorter time window",
                Status::Warning,
            );
        }
    }

    /// Runs the probe with optional overrides and prints the report
    ///
    /// # Errors
    ///
    /// Returns error if the overridden configuration is invalid or the
    /// probe cannot start
    pub async fn run_rate_limit(
        config: &Config,
        attempts: Option<u32>,
        delay_ms: Option<u64>,
    ) -> Result<()> {
        let mut config = config.clone();
        if let Some(attempts) = attempts {
            config.probe.attempts = attempts;
        }
        if let Some(delay_ms) = delay_ms {
            config.probe.delay_ms = delay_ms;
        }
        config.validate()?;

        print_step(
            &format!(
                "Attempting {} rapid login attempts to trigger rate limiting...",
                config.probe.attempts
            ),
            Status::Info,
        );
        let report = RateLimitProbe::from_config(&config).run().await?;
        print_rate_limit_report(&report);
        Ok(())
    }
}
