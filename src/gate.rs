//! Role-based authorization in front of the auth service
//!
//! [`AuthorizationGate::check`] answers "may the current session perform
//! this operation". Validity is never cached: every check revalidates the
//! token with the service first, so a token revoked server-side is refused
//! on the very next privileged call.

use thiserror::Error;

use crate::error::{AuthFailure, FailureKind};
use crate::permissions::{Permission, PermissionTable, Role};
use crate::session::SessionClient;

/// A granted permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    /// Role that carried the permission
    pub role: Role,
    /// Permission that was granted
    pub permission: Permission,
}

/// Reason a permission check was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The session holds no token
    #[error("Permission denied for '{permission}': user not authenticated")]
    NotAuthenticated {
        /// Requested permission, as given by the caller
        permission: String,
    },

    /// Revalidating the token failed
    #[error("Permission denied for '{permission}': invalid authentication ({cause})")]
    InvalidAuthentication {
        /// Requested permission, as given by the caller
        permission: String,
        /// Failure reported by the session client
        cause: AuthFailure,
    },

    /// The session's role does not carry the permission
    #[error("Permission denied for '{permission}': role '{}' lacks it", .role.as_deref().unwrap_or("none"))]
    InsufficientRole {
        /// Requested permission, as given by the caller
        permission: String,
        /// Role reported for the session, if any
        role: Option<String>,
    },
}

impl Denial {
    /// Stable identifier of the denial reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAuthenticated { .. } => "not-authenticated",
            Self::InvalidAuthentication { .. } => "invalid-authentication",
            Self::InsufficientRole { .. } => "insufficient-role",
        }
    }

    /// Denial mapped onto the failure taxonomy
    ///
    /// Revalidation failures keep the kind reported by the session client,
    /// so a network blip stays distinguishable from a revoked token.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotAuthenticated { .. } => FailureKind::Unauthorized,
            Self::InvalidAuthentication { cause, .. } => cause.kind(),
            Self::InsufficientRole { .. } => FailureKind::InsufficientRole,
        }
    }

    /// Requested permission string
    pub fn permission(&self) -> &str {
        match self {
            Self::NotAuthenticated { permission }
            | Self::InvalidAuthentication { permission, .. }
            | Self::InsufficientRole { permission, .. } => permission,
        }
    }
}

/// Permission checks backed by a [`SessionClient`]
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use authgate::gate::AuthorizationGate;
/// use authgate::session::SessionClient;
///
/// # async fn example() -> authgate::error::Result<()> {
/// let session = SessionClient::new("http://localhost:5281", Duration::from_secs(10))?;
/// let mut gate = AuthorizationGate::new(session);
///
/// gate.session_mut().login("cashier", "cashier").await?;
/// match gate.check("POS").await {
///     Ok(grant) => println!("granted to {}", grant.role),
///     Err(denial) => println!("denied: {}", denial.reason()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuthorizationGate {
    session: SessionClient,
    permissions: PermissionTable,
}

impl AuthorizationGate {
    /// Wraps a session with the standard permission table
    pub fn new(session: SessionClient) -> Self {
        Self::with_permissions(session, PermissionTable::standard())
    }

    /// Wraps a session with a custom permission table
    pub fn with_permissions(session: SessionClient, permissions: PermissionTable) -> Self {
        Self {
            session,
            permissions,
        }
    }

    /// Underlying session
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Underlying session, for login and logout
    pub fn session_mut(&mut self) -> &mut SessionClient {
        &mut self.session
    }

    /// Unwraps the session
    pub fn into_session(self) -> SessionClient {
        self.session
    }

    /// Permission table in use
    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Decides whether the session may perform `permission`
    ///
    /// # Errors
    ///
    /// - [`Denial::NotAuthenticated`] when no token is held; no request is
    ///   sent
    /// - [`Denial::InvalidAuthentication`] when revalidation fails
    /// - [`Denial::InsufficientRole`] when the role is missing, unknown,
    ///   or lacks the permission, or the permission name is unknown
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use authgate::gate::AuthorizationGate;
    /// use authgate::session::SessionClient;
    ///
    /// # tokio_test::block_on(async {
    /// let session = SessionClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    /// let mut gate = AuthorizationGate::new(session);
    ///
    /// let denial = gate.check("POS").await.unwrap_err();
    /// assert_eq!(denial.reason(), "not-authenticated");
    /// # });
    /// ```
    pub async fn check(&mut self, permission: &str) -> std::result::Result<Grant, Denial> {
        if self.session.token().is_none() {
            let denial = Denial::NotAuthenticated {
                permission: permission.to_string(),
            };
            tracing::warn!(permission, reason = denial.reason(), "Permission denied");
            return Err(denial);
        }

        if let Err(cause) = self.session.validate_token(None).await {
            let denial = Denial::InvalidAuthentication {
                permission: permission.to_string(),
                cause,
            };
            tracing::warn!(
                permission,
                reason = denial.reason(),
                kind = %denial.kind(),
                "Permission denied"
            );
            return Err(denial);
        }

        let role_name = self
            .session
            .current_user()
            .and_then(|user| user.role.clone());
        let role = role_name.as_deref().and_then(|r| r.parse::<Role>().ok());
        let requested = permission.parse::<Permission>().ok();

        match (role, requested) {
            (Some(role), Some(requested)) if self.permissions.allows(Some(role), requested) => {
                tracing::info!(permission, role = %role, "Permission granted");
                Ok(Grant {
                    role,
                    permission: requested,
                })
            }
            _ => {
                tracing::warn!(
                    permission,
                    role = role_name.as_deref().unwrap_or("-"),
                    reason = "insufficient-role",
                    "Permission denied"
                );
                Err(Denial::InsufficientRole {
                    permission: permission.to_string(),
                    role: role_name,
                })
            }
        }
    }

    /// Like [`check`](Self::check), discarding the reason
    pub async fn is_allowed(&mut self, permission: &str) -> bool {
        self.check(permission).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offline_gate() -> AuthorizationGate {
        // Port 9 (discard) is never expected to serve HTTP.
        let session = SessionClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        AuthorizationGate::new(session)
    }

    #[tokio::test]
    async fn test_check_without_token_denies_every_permission() {
        let mut gate = offline_gate();
        for permission in ["POS", "SYSTEM", "", "not-a-permission"] {
            let denial = gate.check(permission).await.unwrap_err();
            assert_eq!(denial.reason(), "not-authenticated");
            assert_eq!(denial.kind(), FailureKind::Unauthorized);
            assert_eq!(denial.permission(), permission);
        }
    }

    #[test]
    fn test_denial_kind_follows_cause() {
        let denial = Denial::InvalidAuthentication {
            permission: "POS".to_string(),
            cause: AuthFailure::InvalidToken("expired".to_string()),
        };
        assert_eq!(denial.reason(), "invalid-authentication");
        assert_eq!(denial.kind(), FailureKind::InvalidToken);

        let transient = Denial::InvalidAuthentication {
            permission: "POS".to_string(),
            cause: AuthFailure::ServiceUnavailable("connection refused".to_string()),
        };
        assert!(transient.kind().is_transient());
    }

    #[test]
    fn test_insufficient_role_display() {
        let denial = Denial::InsufficientRole {
            permission: "CONFIG".to_string(),
            role: Some("Cashier".to_string()),
        };
        assert_eq!(
            denial.to_string(),
            "Permission denied for 'CONFIG': role 'Cashier' lacks it"
        );

        let roleless = Denial::InsufficientRole {
            permission: "CONFIG".to_string(),
            role: None,
        };
        assert!(roleless.to_string().contains("role 'none'"));
    }

    #[test]
    fn test_gate_uses_standard_table_by_default() {
        let gate = offline_gate();
        assert_eq!(gate.permissions(), &PermissionTable::standard());
    }
}
