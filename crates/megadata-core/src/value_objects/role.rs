//! Account roles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried by a login account
///
/// Bergers are scoped to exactly one service; admins and super admins see
/// every service and manage accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Berger,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Member, Role::Berger, Role::Admin, Role::SuperAdmin];

    /// Admin or super admin
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    #[inline]
    pub fn is_berger(&self) -> bool {
        matches!(self, Self::Berger)
    }

    #[inline]
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member)
    }

    /// Wire name used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Berger => "berger",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "berger" => Ok(Self::Berger),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}
