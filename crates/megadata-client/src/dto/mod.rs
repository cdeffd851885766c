//! Data transfer objects
//!
//! This module provides:
//! - Wire models matching the backend's JSON
//! - Request bodies sent to the backend
//! - Response DTOs returned by services
//! - Mappers from wire models to domain entities and responses

pub mod mappers;
pub mod requests;
pub mod responses;
pub mod wire;

pub use requests::{
    CreateMemberRequest, LoginRequest, MarkAllRequest, RecordPresenceRequest, RegisterRequest,
    UpdateRoleRequest,
};

pub use responses::{
    AuthResponse, DailyAttendance, HealthStatus, PresenceHistoryEntry, PresenceOverview,
    PresenceSheetRow, ServiceAttendance,
};
