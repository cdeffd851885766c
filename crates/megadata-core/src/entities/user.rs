//! User account entity - a login account as seen by administrators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Role, UserId};

/// Login account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Church branch given at self-registration
    pub branch: Option<String>,
    pub role: Role,
    pub assigned_service: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    /// Full name when known, otherwise the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.username.clone(),
        }
    }
}

/// Per-role head count over a list of accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleBreakdown {
    pub total: usize,
    pub members: usize,
    pub bergers: usize,
    pub admins: usize,
}

impl RoleBreakdown {
    pub fn from_accounts(accounts: &[UserAccount]) -> Self {
        accounts.iter().fold(
            Self {
                total: accounts.len(),
                ..Self::default()
            },
            |mut acc, account| {
                match account.role {
                    Role::Member => acc.members += 1,
                    Role::Berger => acc.bergers += 1,
                    Role::Admin | Role::SuperAdmin => acc.admins += 1,
                }
                acc
            },
        )
    }
}
