//! Backend gateways
//!
//! Traits describing the backend operations, plus their REST implementations.

pub mod http;
mod traits;

pub use http::{
    HttpAuthGateway, HttpHealthGateway, HttpMemberGateway, HttpPresenceAdminGateway,
    HttpPresenceGateway, HttpUserGateway,
};
pub use traits::{
    AuthGateway, AuthGrant, HealthGateway, MemberGateway, PresenceAdminGateway, PresenceGateway,
    UserGateway,
};
