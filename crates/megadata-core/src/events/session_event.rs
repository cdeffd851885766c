//! Session events - published whenever the signed-in identity changes
//!
//! Anything holding role-scoped data (rosters, dashboards) subscribes and
//! refetches or drops its state when one of these arrives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Role, UserId};

/// All session lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    LoggedIn(SessionIdentity),
    LoggedOut(SessionIdentity),
    /// Session fields were rewritten in place (e.g. assigned service fixed up)
    Updated(SessionIdentity),
    /// Token found expired, rejected by the backend, or malformed; session purged
    Expired(SessionIdentity),
}

impl SessionEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::LoggedIn(_) => "LOGGED_IN",
            Self::LoggedOut(_) => "LOGGED_OUT",
            Self::Updated(_) => "UPDATED",
            Self::Expired(_) => "EXPIRED",
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        match self {
            Self::LoggedIn(i) | Self::LoggedOut(i) | Self::Updated(i) | Self::Expired(i) => i,
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.identity().timestamp
    }
}

/// Who the event is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub assigned_service: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SessionIdentity {
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        role: Role,
        assigned_service: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            assigned_service,
            timestamp: Utc::now(),
        }
    }
}

impl From<&crate::entities::Session> for SessionIdentity {
    fn from(session: &crate::entities::Session) -> Self {
        Self::new(
            session.user_id,
            session.username.clone(),
            session.role,
            session.assigned_service.clone(),
        )
    }
}
