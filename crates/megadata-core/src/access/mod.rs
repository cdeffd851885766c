//! Screen access control

mod guard;
mod screen;

pub use guard::{GuardDecision, RedirectReason, evaluate, evaluate_screen, is_stale, redirect_for};
pub use screen::{RouteConstraint, Screen};
