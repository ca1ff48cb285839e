//! Auth API security test suite
//!
//! Exercises every endpoint of the auth service in sequence and prints a
//! PASS/FAIL/WARN verdict per expectation. Later stages need a token, so
//! the suite stops early when the service is unhealthy or the login
//! fails.

use crate::config::Config;
use crate::console::{print_banner, print_test, timestamp, TestStatus};
use crate::error::{AuthFailure, FailureKind, Result};
use crate::probe::{HealthOutcome, HealthProbe, RateLimitProbe};
use crate::session::{token_preview, SessionClient};

const BANNER_WIDTH: usize = 60;

/// Token the service must reject
pub const BOGUS_TOKEN: &str = "invalid.token.here";

/// Verdict for the rejected-login expectation
pub fn rejected_login_verdict(
    result: &std::result::Result<(), AuthFailure>,
) -> (TestStatus, String) {
    match result {
        Ok(()) => (
            TestStatus::Fail,
            "Bad credentials were accepted!".to_string(),
        ),
        Err(AuthFailure::BadCredentials(message)) => (
            TestStatus::Pass,
            format!("Login rejected: {}", message),
        ),
        Err(AuthFailure::ServiceUnavailable(message)) => (
            TestStatus::Fail,
            format!("Connection failed: {}", message),
        ),
        Err(other) => (TestStatus::Warn, format!("Unexpected outcome: {}", other)),
    }
}

/// Verdict for the bogus-token expectation
pub fn bogus_token_verdict<T>(result: &std::result::Result<T, AuthFailure>) -> (TestStatus, String) {
    match result {
        Ok(_) => (
            TestStatus::Fail,
            "Invalid token was accepted".to_string(),
        ),
        Err(failure) if failure.kind() == FailureKind::InvalidToken => (
            TestStatus::Pass,
            "Invalid token correctly rejected".to_string(),
        ),
        Err(AuthFailure::ServiceUnavailable(message)) => (
            TestStatus::Fail,
            format!("Connection failed: {}", message),
        ),
        Err(other) => (TestStatus::Warn, format!("Unexpected outcome: {}", other)),
    }
}

/// Runs the suite against the configured service
///
/// # Errors
///
/// Returns error when the suite has to stop early (service unhealthy,
/// no token obtainable) or a client cannot be constructed
pub async fn run_suite(config: &Config) -> Result<()> {
    println!("🚀 Auth API Security Test Suite");
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("Target API: {}", config.service.base_url);
    println!(
        "Test started: {} {}",
        chrono::Local::now().format("%Y-%m-%d"),
        timestamp()
    );

    // 1. Health
    print_banner("🏥 TESTING HEALTH CHECKS", BANNER_WIDTH);
    let health = HealthProbe::from_config(config)?.run().await;
    for check in &health.checks {
        let name = format!("{} - {}", check.endpoint, check.description);
        match &check.outcome {
            HealthOutcome::Status { code, body_preview } if check.is_healthy() => print_test(
                &name,
                TestStatus::Pass,
                Some(&format!("HTTP {} - {}...", code, body_preview)),
            ),
            HealthOutcome::Status { code, .. } => {
                print_test(&name, TestStatus::Fail, Some(&format!("HTTP {}", code)))
            }
            HealthOutcome::Unreachable { error } => print_test(
                &name,
                TestStatus::Fail,
                Some(&format!("Connection failed: {}", error)),
            ),
        }
    }
    if !health.all_healthy() {
        print_test(
            "API Health Check",
            TestStatus::Fail,
            Some("API appears to be down or unhealthy"),
        );
        anyhow::bail!("cannot proceed with tests: auth service is not healthy");
    }

    // 2. Authentication
    print_banner("🔐 TESTING AUTHENTICATION", BANNER_WIDTH);
    let mut session = SessionClient::from_config(&config.service)?;
    print_test(
        &format!(
            "Testing successful login ({}/{})",
            config.demo.username,
            "*".repeat(config.demo.password.len())
        ),
        TestStatus::Info,
        None,
    );
    match session
        .login(&config.demo.username, &config.demo.password)
        .await
    {
        Ok(()) => {
            let preview = session.token().map(token_preview).unwrap_or_default();
            print_test(
                "Successful authentication",
                TestStatus::Pass,
                Some(&format!("Token received: {}", preview)),
            );
        }
        Err(failure) => {
            print_test(
                "Authentication request",
                TestStatus::Fail,
                Some(&failure.to_string()),
            );
        }
    }

    print_test(
        &format!("Testing failed login ({}/wrongpass)", config.demo.username),
        TestStatus::Info,
        None,
    );
    let mut rejected = SessionClient::from_config(&config.service)?;
    let result = rejected.login(&config.demo.username, "wrongpass").await;
    let (status, details) = rejected_login_verdict(&result);
    print_test("Failed authentication", status, Some(&details));

    if !session.is_authenticated() {
        print_test(
            "Authentication Test",
            TestStatus::Fail,
            Some("Cannot obtain valid token"),
        );
        anyhow::bail!("cannot proceed with token-based tests");
    }

    // 3. Token validation
    print_banner("🔍 TESTING TOKEN VALIDATION", BANNER_WIDTH);
    print_test("Testing valid token validation", TestStatus::Info, None);
    match session.validate_token(None).await {
        Ok(validation) => print_test(
            "Valid token validation",
            TestStatus::Pass,
            Some(&format!(
                "User: {} | Role: {}",
                validation.username.as_deref().unwrap_or("-"),
                validation.role.as_deref().unwrap_or("-")
            )),
        ),
        Err(failure) => print_test(
            "Valid token validation",
            TestStatus::Fail,
            Some(&failure.to_string()),
        ),
    }

    // A scratch session: rejecting a token logs its session out.
    print_test("Testing invalid token validation", TestStatus::Info, None);
    let mut scratch = SessionClient::from_config(&config.service)?;
    let result = scratch.validate_token(Some(BOGUS_TOKEN)).await;
    let (status, details) = bogus_token_verdict(&result);
    print_test("Invalid token validation", status, Some(&details));

    // 4. User info
    print_banner("👤 TESTING USER INFO", BANNER_WIDTH);
    print_test("Testing /auth/me endpoint", TestStatus::Info, None);
    match session.fetch_current_user().await {
        Ok(user) => print_test(
            "User info retrieval",
            TestStatus::Pass,
            Some(&format!(
                "User: {} | ID: {} | Role: {}",
                user.username.as_deref().unwrap_or("-"),
                user.user_id.as_deref().unwrap_or("-"),
                user.role.as_deref().unwrap_or("-")
            )),
        ),
        Err(failure) if failure.kind() == FailureKind::Unauthorized => print_test(
            "User info retrieval",
            TestStatus::Fail,
            Some("Token not accepted - authorization failed"),
        ),
        Err(failure) => print_test(
            "User info retrieval",
            TestStatus::Fail,
            Some(&failure.to_string()),
        ),
    }

    // 5. Rate limiting
    print_banner("🛡️  TESTING RATE LIMITING", BANNER_WIDTH);
    print_test(
        &format!(
            "Attempting {} rapid login requests to test rate limiting...",
            config.probe.attempts
        ),
        TestStatus::Info,
        None,
    );
    let report = RateLimitProbe::from_config(config).run().await?;
    for attempt in &report.attempts {
        let name = format!("Request {}", attempt.attempt);
        match &attempt.result {
            Err(AuthFailure::RateLimited(_)) => print_test(
                &name,
                TestStatus::Pass,
                Some("Rate limited (HTTP 429) - Protection working!"),
            ),
            Err(AuthFailure::ServiceUnavailable(message)) => print_test(
                &name,
                TestStatus::Fail,
                Some(&format!("Connection failed: {}", message)),
            ),
            Err(failure) => print_test(
                &name,
                TestStatus::Info,
                Some(&format!("{} (within rate limit)", failure.kind())),
            ),
            Ok(()) => print_test(
                &name,
                TestStatus::Info,
                Some("login accepted (within rate limit)"),
            ),
        }
    }
    if !report.triggered() {
        print_test(
            "Rate limiting test",
            TestStatus::Warn,
            Some("Rate limit not triggered - may need more requests or shorter time window"),
        );
    }

    print_banner("🏁 TEST SUITE COMPLETE", BANNER_WIDTH);
    println!("📋 Features exercised:");
    println!("   🏥 Health checks (/health, /health/ready, /health/live)");
    println!("   🔐 Authentication (/auth/login)");
    println!("   🔍 Token validation (/auth/validate)");
    println!("   👤 User information (/auth/me)");
    println!("   🛡️  Rate limiting protection");

    Ok(())
}
