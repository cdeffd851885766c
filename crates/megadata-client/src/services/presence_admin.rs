//! Presence administration service
//!
//! Read-only views over everyone's attendance for administrators.

use chrono::NaiveDate;
use tracing::instrument;

use megadata_core::{AttendanceRecord, AttendanceStats, MemberId, RouteConstraint};

use crate::dto::{PresenceHistoryEntry, PresenceOverview, ServiceAttendance};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Service filter value meaning "every service"
pub const ALL_SERVICES: &str = "tous";

/// Presence administration service
pub struct PresenceAdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceAdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every presence recorded for `date`, optionally for one service
    #[instrument(skip(self))]
    pub async fn overview(
        &self,
        date: NaiveDate,
        service: Option<&str>,
    ) -> ServiceResult<PresenceOverview> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        let service = service
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SERVICES));
        Ok(self.ctx.presence_admin_gateway().by_date(date, service).await?)
    }

    /// A member's presence history
    #[instrument(skip(self))]
    pub async fn member_history(&self, id: MemberId) -> ServiceResult<Vec<PresenceHistoryEntry>> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        Ok(self.ctx.presence_admin_gateway().member_history(id).await?)
    }

    /// Per-service aggregates over `[start, end]`
    #[instrument(skip(self))]
    pub async fn stats_by_service(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<ServiceAttendance>> {
        self.ctx.require(RouteConstraint::AdminOnly)?;
        Ok(self
            .ctx
            .presence_admin_gateway()
            .stats_by_service(start, end)
            .await?)
    }

    /// Aggregates over an arbitrary record list
    pub fn calculate_stats(records: &[AttendanceRecord]) -> AttendanceStats {
        AttendanceStats::from_records(records)
    }
}
