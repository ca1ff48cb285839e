use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use authgate::session::SessionClient;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// A session client pointed at the mock server with a short timeout.
#[allow(dead_code)]
pub fn session_for(server: &MockServer) -> SessionClient {
    SessionClient::new(&server.uri(), Duration::from_secs(2)).expect("failed to build session")
}

/// A base URL on which nothing is listening.
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().expect("no local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// `/auth/login` accepts exactly `username`/`password` and issues `token`.
#[allow(dead_code)]
pub async fn mount_login(server: &MockServer, username: &str, password: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": username, "password": password })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": token,
            "message": "Login successful"
        })))
        .mount(server)
        .await;
}

/// `/auth/login` rejects everything else with 200 + `success: false`.
#[allow(dead_code)]
pub async fn mount_login_rejection(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "token": null,
            "message": "Invalid username or password"
        })))
        .mount(server)
        .await;
}

/// `/auth/me` answers for `token` with the given identity.
#[allow(dead_code)]
pub async fn mount_me(server: &MockServer, token: &str, user_id: &str, username: &str, role: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": user_id,
            "username": username,
            "role": role
        })))
        .mount(server)
        .await;
}

/// `/auth/validate` reports `token` as valid for `username`/`role`.
#[allow(dead_code)]
pub async fn mount_validate_ok(server: &MockServer, token: &str, username: &str, role: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .and(body_json(json!({ "token": token })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "valid": true,
            "username": username,
            "role": role,
            "message": "Token is valid"
        })))
        .mount(server)
        .await;
}

/// `/auth/validate` reports every token as invalid.
#[allow(dead_code)]
pub async fn mount_validate_invalid(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "valid": false,
            "message": "Token expired or revoked"
        })))
        .mount(server)
        .await;
}

/// Full happy path for one account: login, who-am-i and validation.
#[allow(dead_code)]
pub async fn mount_account(server: &MockServer, username: &str, password: &str, role: &str) -> String {
    let token = format!("token-for-{}-0123456789abcdefghij", username);
    mount_login(server, username, password, &token).await;
    mount_me(server, &token, "7f1c2d", username, role).await;
    mount_validate_ok(server, &token, username, role).await;
    token
}
