//! Session entity - the signed-in identity decoded from a bearer token

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Role, UserId};

/// Authenticated session
///
/// Built once from the login token and persisted between runs. Identity
/// fields default when absent so that a damaged persisted session still
/// loads and can be rejected by the guard instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub assigned_service: Option<String>,
    /// Expiry as a Unix timestamp (seconds)
    pub expires_at: i64,
    /// Raw bearer token sent with every request
    pub token: String,
}

impl Session {
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        role: Role,
        assigned_service: Option<String>,
        expires_at: i64,
        token: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            assigned_service,
            expires_at,
            token: token.into(),
        }
    }

    /// A token is dead once its expiry is at or before `now`
    #[inline]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Both required identity fields are present
    pub fn is_well_formed(&self) -> bool {
        self.user_id.is_assigned() && !self.username.trim().is_empty()
    }

    /// Service a berger records attendance for
    pub fn assigned_service(&self) -> Option<&str> {
        self.assigned_service
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}
