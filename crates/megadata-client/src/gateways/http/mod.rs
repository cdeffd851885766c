//! Gateway implementations
//!
//! REST implementations of the gateway traits, one per backend resource.
//! Each gateway maps wire models to domain types before returning.

mod auth;
mod health;
mod member;
mod presence;
mod presence_admin;
mod user;

pub use auth::HttpAuthGateway;
pub use health::HttpHealthGateway;
pub use member::HttpMemberGateway;
pub use presence::HttpPresenceGateway;
pub use presence_admin::HttpPresenceAdminGateway;
pub use user::HttpUserGateway;
