//! Roles, permissions and the static role → permission table
//!
//! The table is plain data built once per [`AuthorizationGate`](crate::gate::AuthorizationGate).
//! Nothing mutates it after construction, and there is no process-wide
//! instance: two gates never observe each other's table.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named category of user, as reported by the auth service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including configuration and system operations
    Admin,
    /// Store operations and reporting
    Manager,
    /// Point-of-sale and payment operations
    Cashier,
    /// Read-only reporting
    Viewer,
}

impl Role {
    /// Every known role
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Cashier, Role::Viewer];

    /// Role name exactly as the service spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Cashier => "Cashier",
            Self::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Parses a role name. Matching is case-sensitive, mirroring the
    /// service's role claims.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Manager" => Ok(Self::Manager),
            "Cashier" => Ok(Self::Cashier),
            "Viewer" => Ok(Self::Viewer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A named capability gating a business operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    /// Open the point-of-sale terminal
    Pos,
    /// Record sales
    Sales,
    /// Process payments
    Payment,
    /// Generate business reports
    Reports,
    /// Change application configuration
    Config,
    /// System administration
    System,
}

impl Permission {
    /// Every known permission
    pub const ALL: [Permission; 6] = [
        Permission::Pos,
        Permission::Sales,
        Permission::Payment,
        Permission::Reports,
        Permission::Config,
        Permission::System,
    ];

    /// Upper-case permission name, e.g. `"POS"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pos => "POS",
            Self::Sales => "SALES",
            Self::Payment => "PAYMENT",
            Self::Reports => "REPORTS",
            Self::Config => "CONFIG",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "POS" => Ok(Self::Pos),
            "SALES" => Ok(Self::Sales),
            "PAYMENT" => Ok(Self::Payment),
            "REPORTS" => Ok(Self::Reports),
            "CONFIG" => Ok(Self::Config),
            "SYSTEM" => Ok(Self::System),
            other => Err(format!("Unknown permission: {}", other)),
        }
    }
}

/// Immutable mapping from role to granted permissions
///
/// Roles missing from the table, and sessions without a recognizable role,
/// resolve to the empty set.
///
/// # Examples
///
/// ```
/// use authgate::permissions::{Permission, PermissionTable, Role};
///
/// let table = PermissionTable::standard();
/// assert!(table.allows(Some(Role::Cashier), Permission::Payment));
/// assert!(!table.allows(Some(Role::Cashier), Permission::Reports));
/// assert!(!table.allows(None, Permission::Reports));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl PermissionTable {
    /// The ERP permission matrix
    pub fn standard() -> Self {
        use Permission::*;

        Self::from_grants([
            (Role::Admin, vec![Pos, Sales, Payment, Reports, Config, System]),
            (Role::Manager, vec![Pos, Sales, Payment, Reports]),
            (Role::Cashier, vec![Pos, Sales, Payment]),
            (Role::Viewer, vec![Reports]),
        ])
    }

    /// Builds a table from explicit grants. Later entries for the same role
    /// extend earlier ones.
    pub fn from_grants<I, P>(grants: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        let mut table: HashMap<Role, HashSet<Permission>> = HashMap::new();
        for (role, permissions) in grants {
            table.entry(role).or_default().extend(permissions);
        }
        Self { grants: table }
    }

    /// Whether `role` carries `permission`
    pub fn allows(&self, role: Option<Role>, permission: Permission) -> bool {
        role.and_then(|r| self.grants.get(&r))
            .map(|set| set.contains(&permission))
            .unwrap_or(false)
    }

    /// Permissions granted to `role`, in declaration order of [`Permission::ALL`]
    pub fn permissions_for(&self, role: Option<Role>) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.allows(role, *p))
            .collect()
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}
