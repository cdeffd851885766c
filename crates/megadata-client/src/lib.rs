//! # megadata-client
//!
//! Application layer: REST gateways to the MEGA-DATA backend, the session
//! store with its change notifications, and the services behind each screen.

pub mod dto;
pub mod gateways;
pub mod http;
pub mod services;
pub mod session;

pub use http::ApiClient;
pub use services::{
    AttendanceRecorder, AuthService, HealthService, MemberService, PresenceAdminService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStore};
