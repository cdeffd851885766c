//! Session/role guard
//!
//! Decides whether a screen renders for the current session or where the
//! user is sent instead. Evaluation is a pure function of the session, the
//! screen's constraint and the current time; purging a rejected session is
//! left to the caller (see [`GuardDecision::purges_session`] and
//! [`is_stale`], which also covers public screens).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::screen::{RouteConstraint, Screen};
use crate::entities::Session;
use crate::value_objects::Role;

/// Why a redirect was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    NoSession,
    Expired,
    /// Missing id or username
    Malformed,
    RoleMismatch,
    /// Signed-in user on a sign-in page
    AlreadySignedIn,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::Expired => "expired",
            Self::Malformed => "malformed",
            Self::RoleMismatch => "role_mismatch",
            Self::AlreadySignedIn => "already_signed_in",
        }
    }
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    Render,
    Redirect { to: Screen, reason: RedirectReason },
}

impl GuardDecision {
    fn redirect(to: Screen, reason: RedirectReason) -> Self {
        Self::Redirect { to, reason }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }

    /// Target path when redirecting
    pub fn target(&self) -> Option<&'static str> {
        match self {
            Self::Render => None,
            Self::Redirect { to, .. } => Some(to.path()),
        }
    }

    /// The stored session must be dropped
    pub fn purges_session(&self) -> bool {
        matches!(
            self,
            Self::Redirect {
                reason: RedirectReason::Expired | RedirectReason::Malformed,
                ..
            }
        )
    }
}

/// Expired or missing its id/username; such a session is purged on any check
pub fn is_stale(session: &Session, now: i64) -> bool {
    session.is_expired_at(now) || !session.is_well_formed()
}

/// Evaluate a protected screen's constraint. First matching rule wins.
pub fn evaluate(session: Option<&Session>, constraint: RouteConstraint, now: i64) -> GuardDecision {
    let Some(session) = session else {
        return GuardDecision::redirect(Screen::Login, RedirectReason::NoSession);
    };
    if session.is_expired_at(now) {
        return GuardDecision::redirect(Screen::Login, RedirectReason::Expired);
    }
    if !session.is_well_formed() {
        return GuardDecision::redirect(Screen::Login, RedirectReason::Malformed);
    }
    match redirect_for(session.role, constraint) {
        Some(to) => GuardDecision::redirect(to, RedirectReason::RoleMismatch),
        None => GuardDecision::Render,
    }
}

/// Evaluate any screen, public ones included
///
/// Public screens always render for visitors. A valid session landing on
/// the sign-in or registration page is sent to its role's home.
pub fn evaluate_screen(session: Option<&Session>, screen: Screen, now: i64) -> GuardDecision {
    if !screen.is_public() {
        return evaluate(session, screen.constraint(), now);
    }
    let signed_in = session.filter(|s| !is_stale(s, now));
    match (screen, signed_in) {
        (Screen::Login | Screen::Register, Some(s)) => {
            GuardDecision::redirect(Screen::home_for(s.role), RedirectReason::AlreadySignedIn)
        }
        _ => GuardDecision::Render,
    }
}

/// Where a role is sent for a constraint it does not satisfy
pub fn redirect_for(role: Role, constraint: RouteConstraint) -> Option<Screen> {
    match constraint {
        RouteConstraint::None => None,
        RouteConstraint::AdminOnly if !role.is_admin() => Some(if role.is_berger() {
            Screen::Berger
        } else {
            Screen::Dashboard
        }),
        RouteConstraint::BergerOnly if !role.is_berger() => Some(if role.is_admin() {
            Screen::Admin
        } else {
            Screen::Dashboard
        }),
        RouteConstraint::MemberOnly if !role.is_member() => Some(if role.is_berger() {
            Screen::Berger
        } else {
            Screen::Admin
        }),
        _ => None,
    }
}
