//! Response DTOs returned by services

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use megadata_core::{AttendanceStats, MemberId, Screen, Session, UserAccount};

/// Result of a successful login or registration
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub session: Session,
    pub account: Option<UserAccount>,
    /// Screen the user lands on
    pub home: Screen,
}

/// Aggregates for one day of a berger's service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyAttendance {
    pub date: NaiveDate,
    pub stats: AttendanceStats,
}

/// One line of the administrator's presence sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceSheetRow {
    pub member_id: Option<MemberId>,
    pub last_name: String,
    pub first_name: String,
    pub service: String,
    pub neighborhood: String,
    pub present: bool,
    pub comment: Option<String>,
    pub berger_name: Option<String>,
}

impl PresenceSheetRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
            .trim()
            .to_string()
    }
}

/// Every recorded presence for one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceOverview {
    pub date: NaiveDate,
    /// `None` when all services are included
    pub service: Option<String>,
    pub stats: AttendanceStats,
    pub rows: Vec<PresenceSheetRow>,
}

impl PresenceOverview {
    /// Per-service aggregates over the rows, best attendance first
    pub fn by_service(&self) -> Vec<ServiceAttendance> {
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for row in &self.rows {
            let entry = counts.entry(row.service.as_str()).or_default();
            entry.0 += 1;
            entry.1 += usize::from(row.present);
        }
        let mut services: Vec<ServiceAttendance> = counts
            .into_iter()
            .map(|(service, (total, present))| ServiceAttendance {
                service: service.to_string(),
                stats: AttendanceStats::from_counts(total, present),
            })
            .collect();
        services.sort_by(|a, b| b.stats.rate.cmp(&a.stats.rate));
        services
    }
}

/// Aggregates for one service over a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAttendance {
    pub service: String,
    pub stats: AttendanceStats,
}

/// One past presence of a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceHistoryEntry {
    pub date: NaiveDate,
    pub present: bool,
    pub comment: Option<String>,
    pub service: Option<String>,
}

/// Backend reachability
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub online: bool,
    pub base_url: String,
    pub version: Option<String>,
    pub services: Option<serde_json::Value>,
    pub error: Option<String>,
}
