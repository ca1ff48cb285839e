//! Session client integration tests using wiremock
//!
//! Verifies the behaviour of `src/session.rs` against a mock auth service:
//!
//! - login stores the token and loads the user snapshot
//! - every failed login leaves the session untouched and names its kind
//! - validation refreshes on success, logs out on an invalid token and
//!   keeps the session on transport failures
//! - `/auth/me` failures keep the previous snapshot

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use authgate::error::FailureKind;
use authgate::session::SessionClient;

mod common;

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_with_valid_credentials_populates_session() {
    let server = MockServer::start().await;
    let token = common::mount_account(&server, "admin", "admin", "Admin").await;

    let mut session = common::session_for(&server);
    let result = session.login("admin", "admin").await;

    assert!(result.is_ok(), "login must succeed, got: {:?}", result.err());
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some(token.as_str()));

    let user = session.current_user().expect("user snapshot must be loaded");
    assert_eq!(user.username.as_deref(), Some("admin"));
    assert_eq!(user.role.as_deref(), Some("Admin"));
    assert_eq!(user.user_id.as_deref(), Some("7f1c2d"));
}

#[tokio::test]
async fn test_login_with_invalid_credentials_leaves_session_empty() {
    let server = MockServer::start().await;
    common::mount_account(&server, "admin", "admin", "Admin").await;
    common::mount_login_rejection(&server).await;

    let mut session = common::session_for(&server);
    let failure = session.login("admin", "wrong").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::BadCredentials);
    assert_eq!(failure.message(), "Invalid username or password");
    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let server = MockServer::start().await;
    let token = common::mount_account(&server, "admin", "admin", "Admin").await;
    common::mount_login_rejection(&server).await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();
    let before = session.current_user().cloned();

    let failure = session.login("hacker", "wrongpassword").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::BadCredentials);
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some(token.as_str()));
    assert_eq!(session.current_user().cloned(), before);
}

#[tokio::test]
async fn test_login_401_is_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    let failure = session.login("admin", "wrongpass").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::BadCredentials);
    assert_eq!(failure.message(), "Invalid credentials");
}

#[tokio::test]
async fn test_login_429_is_rate_limited_not_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    let failure = session.login("test", "wrong").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::RateLimited);
    assert!(failure.kind().is_transient());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_sixth_rapid_login_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(5)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    let mut kinds = Vec::new();
    for _ in 0..6 {
        kinds.push(session.login("test", "wrong").await.unwrap_err().kind());
    }

    assert_eq!(kinds[..5], [FailureKind::BadCredentials; 5]);
    assert_eq!(kinds[5], FailureKind::RateLimited);
}

#[tokio::test]
async fn test_login_server_error_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    let failure = session.login("admin", "admin").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(failure.message().contains("503"));
}

#[tokio::test]
async fn test_login_non_json_body_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    let failure = session.login("admin", "admin").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_success_without_token_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    let failure = session.login("admin", "admin").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_login_connection_failure_is_service_unavailable() {
    let mut session =
        SessionClient::new(&common::closed_port_url(), Duration::from_secs(2)).unwrap();

    let failure = session.login("admin", "admin").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_timeout_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "token": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut session = SessionClient::new(&server.uri(), Duration::from_millis(300)).unwrap();
    let failure = session.login("admin", "admin").await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(failure.message().contains("timed out"));
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_login_succeeds_even_if_user_lookup_fails() {
    let server = MockServer::start().await;
    common::mount_login(&server, "admin", "admin", "tok-123").await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok-123"));
    assert!(session.current_user().is_none());
}

// ---------------------------------------------------------------------------
// validate_token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_validate_valid_token_keeps_token() {
    let server = MockServer::start().await;
    let token = common::mount_account(&server, "admin", "admin", "Admin").await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();

    let validation = session.validate_token(None).await.unwrap();

    assert_eq!(validation.username.as_deref(), Some("admin"));
    assert_eq!(validation.role.as_deref(), Some("Admin"));
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some(token.as_str()));
    // user id from /auth/me survives the refresh
    assert_eq!(
        session.current_user().and_then(|u| u.user_id.as_deref()),
        Some("7f1c2d")
    );
}

#[tokio::test]
async fn test_validate_refreshes_role() {
    let server = MockServer::start().await;
    common::mount_login(&server, "maria", "pw", "tok-maria").await;
    common::mount_me(&server, "tok-maria", "11", "maria", "Cashier").await;
    common::mount_validate_ok(&server, "tok-maria", "maria", "Manager").await;

    let mut session = common::session_for(&server);
    session.login("maria", "pw").await.unwrap();
    assert_eq!(
        session.current_user().and_then(|u| u.role.as_deref()),
        Some("Cashier")
    );

    session.validate_token(None).await.unwrap();
    assert_eq!(
        session.current_user().and_then(|u| u.role.as_deref()),
        Some("Manager")
    );
}

#[tokio::test]
async fn test_validate_invalid_token_clears_session() {
    let server = MockServer::start().await;
    common::mount_login(&server, "admin", "admin", "tok-revoked").await;
    common::mount_me(&server, "tok-revoked", "1", "admin", "Admin").await;
    common::mount_validate_invalid(&server).await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();

    let failure = session.validate_token(None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::InvalidToken);
    assert_eq!(failure.message(), "Token expired or revoked");
    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_validate_override_token() {
    let server = MockServer::start().await;
    common::mount_validate_ok(&server, "someone-elses-token", "viewer", "Viewer").await;

    let mut session = common::session_for(&server);
    let validation = session
        .validate_token(Some("someone-elses-token"))
        .await
        .unwrap();

    assert_eq!(validation.role.as_deref(), Some("Viewer"));
    // validating a foreign token does not adopt it
    assert!(session.token().is_none());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_validate_transport_failure_keeps_session() {
    let server = MockServer::start().await;
    common::mount_login(&server, "admin", "admin", "tok-1").await;
    common::mount_me(&server, "tok-1", "1", "admin", "Admin").await;
    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();

    let failure = session.validate_token(None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok-1"));
    assert!(session.current_user().is_some());
}

#[tokio::test]
async fn test_validate_after_service_goes_away_keeps_session() {
    let server = MockServer::builder().start().await;
    common::mount_account(&server, "admin", "admin", "Admin").await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();
    drop(server);

    let failure = session.validate_token(None).await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ServiceUnavailable);
    assert!(session.is_authenticated());
}

// ---------------------------------------------------------------------------
// fetch_current_user / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_current_user_401_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    common::mount_account(&server, "admin", "admin", "Admin").await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();
    let before = session.current_user().cloned();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let failure = session.fetch_current_user().await.unwrap_err();

    assert_eq!(failure.kind(), FailureKind::Unauthorized);
    assert!(failure.kind().needs_login());
    assert_eq!(session.current_user().cloned(), before);
}

#[tokio::test]
async fn test_logout_clears_everything_without_network() {
    let server = MockServer::start().await;
    common::mount_account(&server, "admin", "admin", "Admin").await;

    let mut session = common::session_for(&server);
    session.login("admin", "admin").await.unwrap();
    let requests_before = server.received_requests().await.unwrap_or_default().len();

    session.logout();
    session.logout();

    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
    let requests_after = server.received_requests().await.unwrap_or_default().len();
    assert_eq!(requests_before, requests_after);
}

#[tokio::test]
async fn test_validate_keeps_fields_the_response_omits() {
    let server = MockServer::start().await;
    common::mount_login(&server, "maria", "pw", "tok-maria").await;
    common::mount_me(&server, "tok-maria", "11", "maria", "Cashier").await;
    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "valid": true,
            "role": null
        })))
        .mount(&server)
        .await;

    let mut session = common::session_for(&server);
    session.login("maria", "pw").await.unwrap();

    let validation = session.validate_token(None).await.unwrap();
    assert!(validation.role.is_none());

    let user = session.current_user().expect("snapshot must survive");
    assert_eq!(user.user_id.as_deref(), Some("11"));
    assert_eq!(user.username.as_deref(), Some("maria"));
    assert_eq!(user.role.as_deref(), Some("Cashier"));
    assert!(session.is_authenticated());
}
