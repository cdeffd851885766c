//! Screens and the role constraint each one declares

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Role;

/// Role requirement declared by a protected screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RouteConstraint {
    /// Any signed-in role
    #[default]
    None,
    MemberOnly,
    BergerOnly,
    /// Admin or super admin
    AdminOnly,
}

impl RouteConstraint {
    pub const ALL: [RouteConstraint; 4] = [
        RouteConstraint::None,
        RouteConstraint::MemberOnly,
        RouteConstraint::BergerOnly,
        RouteConstraint::AdminOnly,
    ];

    /// Whether `role` satisfies this constraint
    pub fn admits(&self, role: Role) -> bool {
        match self {
            Self::None => true,
            Self::MemberOnly => role.is_member(),
            Self::BergerOnly => role.is_berger(),
            Self::AdminOnly => role.is_admin(),
        }
    }
}

/// Every screen of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Public landing page
    Landing,
    Login,
    Register,
    /// Signed-in home, open to every role
    Home,
    /// Member dashboard
    Dashboard,
    /// Berger dashboard
    Berger,
    /// Attendance taking
    Presence,
    /// Administration (all `/admin/*` sub-pages)
    Admin,
}

impl Screen {
    pub const ALL: [Screen; 8] = [
        Screen::Landing,
        Screen::Login,
        Screen::Register,
        Screen::Home,
        Screen::Dashboard,
        Screen::Berger,
        Screen::Presence,
        Screen::Admin,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/home",
            Self::Dashboard => "/dashboard",
            Self::Berger => "/berger",
            Self::Presence => "/presence",
            Self::Admin => "/admin",
        }
    }

    /// Reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Landing | Self::Login | Self::Register)
    }

    /// Role requirement of a protected screen; public screens have none
    pub fn constraint(&self) -> RouteConstraint {
        match self {
            Self::Landing | Self::Login | Self::Register | Self::Home => RouteConstraint::None,
            Self::Dashboard => RouteConstraint::MemberOnly,
            Self::Berger | Self::Presence => RouteConstraint::BergerOnly,
            Self::Admin => RouteConstraint::AdminOnly,
        }
    }

    /// Map a path to its screen; unknown paths fall back to the landing page
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Landing,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/home" => Self::Home,
            "/dashboard" => Self::Dashboard,
            "/berger" => Self::Berger,
            "/presence" => Self::Presence,
            p if p == "/admin" || p.starts_with("/admin/") => Self::Admin,
            _ => Self::Landing,
        }
    }

    /// Landing screen after sign-in for a role
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Admin | Role::SuperAdmin => Self::Admin,
            Role::Berger => Self::Berger,
            Role::Member => Self::Dashboard,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
