//! Domain entities - core business objects

mod attendance;
mod member;
mod session;
mod user;

pub use attendance::AttendanceRecord;
pub use member::{Member, NewMember};
pub use session::Session;
pub use user::{RoleBreakdown, UserAccount};
