//! Gateway traits (ports) - the backend operations services depend on
//!
//! Services only see these traits; [`super::http`] provides the REST
//! implementations and tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;

use megadata_common::AppResult;
use megadata_core::{AttendanceRecord, Member, MemberId, Role, UserAccount, UserId};

use crate::dto::{
    CreateMemberRequest, DailyAttendance, HealthStatus, LoginRequest, PresenceHistoryEntry,
    PresenceOverview, RecordPresenceRequest, RegisterRequest, ServiceAttendance,
};

/// Token issued by a successful login or registration
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: String,
    pub account: Option<UserAccount>,
}

// ============================================================================
// Auth Gateway
// ============================================================================

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthGrant>;

    async fn register(&self, request: &RegisterRequest) -> AppResult<AuthGrant>;

    /// Account behind the current bearer token
    async fn profile(&self) -> AppResult<UserAccount>;
}

// ============================================================================
// Member Gateway
// ============================================================================

#[async_trait]
pub trait MemberGateway: Send + Sync {
    /// Roster of the signed-in berger's service
    async fn my_members(&self) -> AppResult<Vec<Member>>;

    /// Every member (admin)
    async fn all_members(&self) -> AppResult<Vec<Member>>;

    async fn search(&self, query: Option<&str>, service: Option<&str>) -> AppResult<Vec<Member>>;

    /// Register a member; the backend may omit the created record
    async fn create(&self, request: &CreateMemberRequest) -> AppResult<Option<Member>>;

    async fn delete(&self, id: MemberId) -> AppResult<()>;
}

// ============================================================================
// User Gateway
// ============================================================================

#[async_trait]
pub trait UserGateway: Send + Sync {
    async fn list(&self) -> AppResult<Vec<UserAccount>>;

    async fn set_role(&self, id: UserId, role: Role) -> AppResult<()>;

    async fn delete(&self, id: UserId) -> AppResult<()>;
}

// ============================================================================
// Presence Gateway
// ============================================================================

#[async_trait]
pub trait PresenceGateway: Send + Sync {
    /// Records already saved for `date`
    async fn records_for(&self, date: NaiveDate) -> AppResult<Vec<AttendanceRecord>>;

    /// Create or overwrite one member's record
    async fn record(&self, request: &RecordPresenceRequest) -> AppResult<()>;

    /// Mark the whole roster present; returns the backend's message
    async fn mark_all_present(&self, date: NaiveDate) -> AppResult<Option<String>>;

    /// Daily totals between two dates, inclusive
    async fn stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyAttendance>>;

    /// Backend-built report for one date
    async fn report(&self, date: NaiveDate) -> AppResult<serde_json::Value>;
}

// ============================================================================
// Presence Admin Gateway
// ============================================================================

#[async_trait]
pub trait PresenceAdminGateway: Send + Sync {
    /// Every presence for `date`, optionally limited to one service
    async fn by_date(&self, date: NaiveDate, service: Option<&str>) -> AppResult<PresenceOverview>;

    async fn member_history(&self, id: MemberId) -> AppResult<Vec<PresenceHistoryEntry>>;

    async fn stats_by_service(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<ServiceAttendance>>;
}

// ============================================================================
// Health Gateway
// ============================================================================

#[async_trait]
pub trait HealthGateway: Send + Sync {
    async fn health(&self) -> HealthStatus;
}
