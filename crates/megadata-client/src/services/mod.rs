//! Service layer - application use cases
//!
//! Each service borrows a [`ServiceContext`] and enforces the role rules of
//! its screen before calling the backend. The [`AttendanceRecorder`] owns
//! its context because it keeps the sheet being edited.

mod attendance;
mod auth;
mod context;
mod error;
mod feedback;
mod health;
mod member;
mod presence_admin;
mod user;

#[cfg(test)]
pub(crate) mod fakes;

pub use attendance::{AttendanceRecorder, HISTORY_WINDOW_DAYS};
pub use auth::{AuthService, SessionUpdate};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use feedback::{Banner, BannerKind, Feedback, SUCCESS_BANNER_TTL};
pub use health::HealthService;
pub use member::MemberService;
pub use presence_admin::{PresenceAdminService, ALL_SERVICES};
pub use user::UserService;
