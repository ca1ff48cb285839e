//! Error types for authgate
//!
//! Two families of errors live here:
//!
//! - [`AuthGateError`]: application-level failures (configuration, I/O,
//!   client construction) that propagate to the CLI through [`Result`].
//! - [`AuthFailure`] and [`FailureKind`]: the closed taxonomy every session
//!   and gate operation resolves to. Raw transport errors never escape the
//!   session client; they are folded into one of these kinds first.

use std::fmt;

use thiserror::Error;

/// Main error type for authgate operations outside the session core
#[derive(Error, Debug)]
pub enum AuthGateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured service URL could not be parsed
    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for authgate operations
///
/// Uses `anyhow::Error` so command handlers can attach context while
/// still carrying typed [`AuthGateError`] values underneath.
pub type Result<T> = anyhow::Result<T>;

/// Category of a failed authentication or authorization step
///
/// Callers branch on the kind rather than on messages: transient kinds
/// mean "try again later", credential kinds mean "fix your input", and
/// session kinds mean "log in again".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The service rejected the username/password pair
    BadCredentials,
    /// The service answered HTTP 429
    RateLimited,
    /// Timeout, connection failure, unexpected status or malformed body
    ServiceUnavailable,
    /// The service reported the token as invalid or expired
    InvalidToken,
    /// No token was available, or a protected resource answered 401
    Unauthorized,
    /// The session's role does not carry the requested permission
    InsufficientRole,
}

impl FailureKind {
    /// Stable kebab-case identifier, suitable for logs and JSON output
    ///
    /// # Examples
    ///
    /// ```
    /// use authgate::error::FailureKind;
    ///
    /// assert_eq!(FailureKind::RateLimited.as_str(), "rate-limited");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadCredentials => "bad-credentials",
            Self::RateLimited => "rate-limited",
            Self::ServiceUnavailable => "service-unavailable",
            Self::InvalidToken => "invalid-token",
            Self::Unauthorized => "unauthorized",
            Self::InsufficientRole => "insufficient-role",
        }
    }

    /// Whether retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServiceUnavailable)
    }

    /// Whether the caller has to obtain a fresh token
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::Unauthorized)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by [`SessionClient`](crate::session::SessionClient) operations
///
/// Every variant carries a human-readable message; the category is
/// available through [`AuthFailure::kind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Credentials were rejected
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    /// Too many attempts; the service answered HTTP 429
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The service could not be reached or answered unexpectedly
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The token was reported invalid or expired
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// No token held, or the service answered 401 on a protected resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AuthFailure {
    /// Category of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::BadCredentials(_) => FailureKind::BadCredentials,
            Self::RateLimited(_) => FailureKind::RateLimited,
            Self::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
            Self::InvalidToken(_) => FailureKind::InvalidToken,
            Self::Unauthorized(_) => FailureKind::Unauthorized,
        }
    }

    /// Message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::BadCredentials(m)
            | Self::RateLimited(m)
            | Self::ServiceUnavailable(m)
            | Self::InvalidToken(m)
            | Self::Unauthorized(m) => m,
        }
    }
}

impl From<reqwest::Error> for AuthFailure {
    fn from(err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "connection failed"
        } else if err.is_decode() {
            "malformed response body"
        } else {
            "request failed"
        };
        Self::ServiceUnavailable(format!("{}: {}", detail, err))
    }
}
