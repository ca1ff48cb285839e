//! Session client for the external auth service
//!
//! [`SessionClient`] holds the bearer token issued by `/auth/login` and a
//! snapshot of the user it belongs to. Every operation performs at most
//! one HTTP exchange, bounded by the client timeout, and resolves every
//! outcome into either a value or an [`AuthFailure`]. Transport errors
//! never leave this module unclassified.
//!
//! Session state transitions:
//!
//! - [`SessionClient::login`] stores a token, marks the session
//!   authenticated and fetches the user snapshot.
//! - [`SessionClient::validate_token`] refreshes the snapshot on success and
//!   logs out when the service reports the token invalid. Transport
//!   failures leave the session alone.
//! - [`SessionClient::logout`] clears everything locally.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{AuthFailure, Result};

/// Number of token characters that may appear in logs
const TOKEN_PREVIEW_CHARS: usize = 20;

/// Identity of the authenticated user, as last reported by the service
///
/// Populated from `/auth/me`; username and role are refreshed by every
/// successful `/auth/validate` of the held token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    /// Service-side user identifier
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
    /// Role name, e.g. `"Cashier"`
    #[serde(default)]
    pub role: Option<String>,
}

/// Successful `/auth/validate` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValidation {
    /// Username the token was issued to
    pub username: Option<String>,
    /// Role carried by the token
    pub role: Option<String>,
    /// Free-form message from the service
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Accepts `"42"`, `42` or `null` for identifiers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Returns the loggable prefix of a token
///
/// # Examples
///
/// ```
/// use authgate::session::token_preview;
///
/// assert_eq!(token_preview("abc"), "abc...");
/// assert_eq!(token_preview("0123456789abcdefghijXYZ"), "0123456789abcdefghij...");
/// ```
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{}...", prefix)
}

/// Client-side authentication session against the auth service
///
/// The client is single-owner: every state-changing operation takes
/// `&mut self`, so one session never sees overlapping requests.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use authgate::session::SessionClient;
///
/// # async fn example() -> authgate::error::Result<()> {
/// let mut session = SessionClient::new("http://localhost:5281", Duration::from_secs(10))?;
/// if session.login("admin", "admin").await.is_ok() {
///     session.validate_token(None).await?;
/// }
/// session.logout();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    current_user: Option<UserSnapshot>,
    authenticated: bool,
}

impl SessionClient {
    /// Creates a client with an empty session
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the auth service
    /// * `timeout` - Upper bound for every request
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
            token: None,
            current_user: None,
            authenticated: false,
        })
    }

    /// Creates a client from the `service` configuration section
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Currently held bearer token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Snapshot of the authenticated user
    pub fn current_user(&self) -> Option<&UserSnapshot> {
        self.current_user.as_ref()
    }

    /// Whether the session holds a token that last validated successfully
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Authenticates with username and password
    ///
    /// On success the token is stored and the user snapshot is fetched from
    /// `/auth/me`. A failed snapshot fetch is logged but does not undo the
    /// login. On failure the session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`AuthFailure::BadCredentials`] when the service rejects the pair
    /// - [`AuthFailure::RateLimited`] on HTTP 429
    /// - [`AuthFailure::ServiceUnavailable`] on any other status, a
    ///   malformed body, a timeout or a connection failure
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> std::result::Result<(), AuthFailure> {
        tracing::info!(username, "Attempting login");

        let url = self.endpoint("auth/login")?;
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| log_failure("login", AuthFailure::from(e)))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(log_failure(
                    "login",
                    AuthFailure::RateLimited("login blocked by rate limiting (HTTP 429)".into()),
                ));
            }
            StatusCode::UNAUTHORIZED => {
                let message = response
                    .json::<LoginResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_else(|| "invalid username or password".to_string());
                return Err(log_failure("login", AuthFailure::BadCredentials(message)));
            }
            status => {
                return Err(log_failure(
                    "login",
                    AuthFailure::ServiceUnavailable(format!("login returned HTTP {}", status)),
                ));
            }
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| log_failure("login", AuthFailure::from(e)))?;

        if !body.success {
            let message = body.message.unwrap_or_else(|| "Unknown error".to_string());
            return Err(log_failure("login", AuthFailure::BadCredentials(message)));
        }

        let token = body.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            log_failure(
                "login",
                AuthFailure::ServiceUnavailable("login succeeded without a token".into()),
            )
        })?;

        tracing::info!(
            username,
            token = %token_preview(&token),
            "Login successful"
        );

        self.token = Some(token);
        self.authenticated = true;
        self.current_user = None;

        if let Err(failure) = self.fetch_current_user().await {
            tracing::warn!(error = %failure, "Logged in but could not load user details");
        }

        Ok(())
    }

    /// Validates a token with the service
    ///
    /// Uses `token_override` when given, otherwise the held token. When the
    /// held token validates, the snapshot's username and role are refreshed
    /// from the fields the response carries and the stored token stays
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`AuthFailure::Unauthorized`] when there is no token to validate
    /// - [`AuthFailure::InvalidToken`] when the service reports the token
    ///   invalid or expired; the session is logged out first
    /// - [`AuthFailure::ServiceUnavailable`] on transport failures,
    ///   unexpected statuses and malformed bodies; the session is kept
    pub async fn validate_token(
        &mut self,
        token_override: Option<&str>,
    ) -> std::result::Result<TokenValidation, AuthFailure> {
        let token = match token_override.or(self.token.as_deref()) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                return Err(log_failure(
                    "validate",
                    AuthFailure::Unauthorized("no token available for validation".into()),
                ));
            }
        };

        tracing::debug!(token = %token_preview(&token), "Validating authentication token");

        let url = self.endpoint("auth/validate")?;
        let response = self
            .http
            .post(url)
            .json(&ValidateRequest { token: &token })
            .send()
            .await
            .map_err(|e| log_failure("validate", AuthFailure::from(e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(log_failure(
                "validate",
                AuthFailure::ServiceUnavailable(format!(
                    "token validation returned HTTP {}",
                    status
                )),
            ));
        }

        let body: ValidateResponse = response
            .json()
            .await
            .map_err(|e| log_failure("validate", AuthFailure::from(e)))?;

        if !(body.success && body.valid) {
            let message = body.message.unwrap_or_else(|| "Invalid token".to_string());
            self.logout();
            return Err(log_failure("validate", AuthFailure::InvalidToken(message)));
        }

        tracing::info!(
            username = body.username.as_deref().unwrap_or("-"),
            role = body.role.as_deref().unwrap_or("-"),
            "Token valid"
        );

        if self.token.as_deref() == Some(token.as_str()) {
            // Fields the response omits keep their /auth/me values.
            let previous = self.current_user.take().unwrap_or_default();
            self.current_user = Some(UserSnapshot {
                user_id: previous.user_id,
                username: body.username.clone().or(previous.username),
                role: body.role.clone().or(previous.role),
            });
            self.authenticated = true;
        }

        Ok(TokenValidation {
            username: body.username,
            role: body.role,
            message: body.message,
        })
    }

    /// Loads the authenticated user's identity from `/auth/me`
    ///
    /// # Errors
    ///
    /// - [`AuthFailure::Unauthorized`] without a token or on HTTP 401
    /// - [`AuthFailure::ServiceUnavailable`] on anything else that is not
    ///   a well-formed 200 response
    ///
    /// The previous snapshot is kept on every failure.
    pub async fn fetch_current_user(&mut self) -> std::result::Result<UserSnapshot, AuthFailure> {
        let token = match self.token.as_deref() {
            Some(t) => t,
            None => {
                return Err(log_failure(
                    "me",
                    AuthFailure::Unauthorized("no authentication token available".into()),
                ));
            }
        };

        let url = self.endpoint("auth/me")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| log_failure("me", AuthFailure::from(e)))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                return Err(log_failure(
                    "me",
                    AuthFailure::Unauthorized("token not accepted by /auth/me".into()),
                ));
            }
            status => {
                return Err(log_failure(
                    "me",
                    AuthFailure::ServiceUnavailable(format!("user lookup returned HTTP {}", status)),
                ));
            }
        }

        let user: UserSnapshot = response
            .json()
            .await
            .map_err(|e| log_failure("me", AuthFailure::from(e)))?;

        tracing::info!(
            username = user.username.as_deref().unwrap_or("-"),
            user_id = user.user_id.as_deref().unwrap_or("-"),
            role = user.role.as_deref().unwrap_or("-"),
            "Loaded current user"
        );

        self.current_user = Some(user.clone());
        Ok(user)
    }

    /// Clears the token, user snapshot and authenticated flag
    ///
    /// Purely local and idempotent.
    pub fn logout(&mut self) {
        if self.token.is_some() {
            tracing::info!("Logging out");
        }
        self.token = None;
        self.current_user = None;
        self.authenticated = false;
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, AuthFailure> {
        self.base_url.join(path).map_err(|e| {
            AuthFailure::ServiceUnavailable(format!("cannot build URL for {}: {}", path, e))
        })
    }
}

/// Parses the base URL and makes sure relative joins keep its path
pub(crate) fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(crate::error::AuthGateError::from)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn log_failure(operation: &str, failure: AuthFailure) -> AuthFailure {
    tracing::warn!(operation, kind = %failure.kind(), "{}", failure);
    failure
}
