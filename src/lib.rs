//! authgate - session client and authorization gate for an HTTP auth service
//!
//! This library lets a legacy application delegate authentication to an
//! external auth service: it logs in, keeps the bearer token, revalidates
//! it before privileged operations and checks the session's role against
//! a fixed permission table.
//!
//! # Architecture
//!
//! - `session`: bearer token and user snapshot; login, validate, who-am-i, logout
//! - `permissions`: roles, permissions and the immutable role → permission table
//! - `gate`: authorization checks that revalidate the token on every call
//! - `probe`: health and rate-limit probes returning structured reports
//! - `console`: colored, timestamped console formatting
//! - `commands`: CLI command handlers (showcase, test suite, ad-hoc checks)
//! - `config`: configuration management and validation
//! - `error`: error types, the failure taxonomy and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use authgate::{AuthorizationGate, Config, SessionClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let mut gate = AuthorizationGate::new(SessionClient::from_config(&config.service)?);
//!     gate.session_mut().login("admin", "admin").await?;
//!     assert!(gate.is_allowed("SYSTEM").await);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod gate;
pub mod permissions;
pub mod probe;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{AuthFailure, AuthGateError, FailureKind, Result};
pub use gate::{AuthorizationGate, Denial, Grant};
pub use permissions::{Permission, PermissionTable, Role};
pub use session::{SessionClient, UserSnapshot};
