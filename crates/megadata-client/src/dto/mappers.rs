//! Wire model -> domain entity / response mappers

use chrono::NaiveDate;

use megadata_common::{canonical_service, AppError};
use megadata_core::{AttendanceRecord, AttendanceStats, Member, Role, UserAccount};

use super::responses::{
    DailyAttendance, PresenceHistoryEntry, PresenceOverview, PresenceSheetRow, ServiceAttendance,
};
use super::wire::{
    AdminPresencePayload, AdminPresenceRowModel, DailyStatsModel, HistoryRowModel, MemberModel,
    PresenceEntryModel, ServiceStatsModel, UserModel,
};

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn count(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Convert MemberModel to Member entity
impl From<MemberModel> for Member {
    fn from(model: MemberModel) -> Self {
        Member {
            id: model.id,
            last_name: model.nom,
            first_name: model.prenom,
            phone: model.numero,
            neighborhood: model.quartier,
            service: model.service,
            registered_by: model.user_id,
            registered_by_username: non_blank(model.username),
            // Missing timestamps sort as the oldest possible registration
            created_at: model.created_at.unwrap_or_default(),
        }
    }
}

/// Convert UserModel to UserAccount entity
impl TryFrom<UserModel> for UserAccount {
    type Error = AppError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let role: Role = model.role.parse().map_err(AppError::Decode)?;
        Ok(UserAccount {
            id: model.id,
            username: model.username,
            first_name: non_blank(model.prenom),
            last_name: non_blank(model.nom),
            branch: non_blank(model.branche),
            role,
            assigned_service: canonical_service(model.service_assigne, model.service_assigne_camel),
            created_at: model.created_at,
        })
    }
}

/// Existing record from `/presence/date/{date}`, if the member has one
pub fn presence_record(entry: PresenceEntryModel, date: NaiveDate) -> Option<AttendanceRecord> {
    let presence = entry.presence?;
    let mut record = AttendanceRecord::new(entry.membre_id, date, presence.present);
    record.comment = non_blank(presence.commentaire);
    Some(record)
}

impl From<DailyStatsModel> for DailyAttendance {
    fn from(model: DailyStatsModel) -> Self {
        DailyAttendance {
            date: model.date,
            stats: AttendanceStats::from_counts(count(model.total_membres), count(model.presents)),
        }
    }
}

impl From<AdminPresenceRowModel> for PresenceSheetRow {
    fn from(model: AdminPresenceRowModel) -> Self {
        PresenceSheetRow {
            member_id: model.membre_id,
            last_name: model.nom,
            first_name: model.prenom,
            service: model.service,
            neighborhood: model.quartier,
            present: model.present,
            comment: non_blank(model.commentaire),
            berger_name: non_blank(model.berger_nom),
        }
    }
}

/// Assemble the admin overview; counts fall back to the rows when absent
pub fn presence_overview(
    payload: AdminPresencePayload,
    date: NaiveDate,
    service: Option<String>,
) -> PresenceOverview {
    let rows: Vec<PresenceSheetRow> = payload.data.into_iter().map(Into::into).collect();
    let stats = if payload.total == 0 && !rows.is_empty() {
        AttendanceStats::from_counts(rows.len(), rows.iter().filter(|r| r.present).count())
    } else {
        AttendanceStats::from_counts(count(payload.total), count(payload.presents))
    };
    PresenceOverview {
        date,
        service,
        stats,
        rows,
    }
}

impl From<HistoryRowModel> for PresenceHistoryEntry {
    fn from(model: HistoryRowModel) -> Self {
        PresenceHistoryEntry {
            date: model.date,
            present: model.present,
            comment: non_blank(model.commentaire),
            service: non_blank(model.service),
        }
    }
}

impl From<ServiceStatsModel> for ServiceAttendance {
    fn from(model: ServiceStatsModel) -> Self {
        ServiceAttendance {
            service: model.service,
            stats: AttendanceStats::from_counts(count(model.total), count(model.presents)),
        }
    }
}
