//! Backend wire models
//!
//! Field names match the JSON the backend emits (French, snake_case).
//! Nothing outside `dto` sees these types; [`super::mappers`] turns them
//! into domain entities and response DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use megadata_core::{MemberId, UserId};

/// Common `{ success, message?, ... }` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

fn default_true() -> bool {
    true
}

/// Envelope body with nothing besides `success` and `message`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserModel {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branche: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_assigne: Option<String>,
    #[serde(default, rename = "serviceAssigne", skip_serializing_if = "Option::is_none")]
    pub service_assigne_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub user: UserModel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersPayload {
    #[serde(default)]
    pub users: Vec<UserModel>,
}

// ============================================================================
// Members
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberModel {
    pub id: MemberId,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub quartier: String,
    #[serde(default)]
    pub service: String,
    /// Account that registered the member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembersPayload {
    #[serde(default)]
    pub membres: Vec<MemberModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPayload {
    #[serde(default, alias = "membre", skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberModel>,
}

// ============================================================================
// Presence
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceModel {
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceEntryModel {
    pub membre_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresenceByDatePayload {
    #[serde(default)]
    pub membres: Vec<PresenceEntryModel>,
}

/// One day of `/presence/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatsModel {
    #[serde(deserialize_with = "calendar_day")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "count")]
    pub total_membres: u64,
    #[serde(default, deserialize_with = "count")]
    pub presents: u64,
    #[serde(default, deserialize_with = "count")]
    pub absents: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyStatsPayload {
    #[serde(default)]
    pub stats: Vec<DailyStatsModel>,
}

/// Row of the admin presence sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPresenceRowModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membre_id: Option<MemberId>,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub service: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub quartier: String,
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berger_nom: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPresencePayload {
    #[serde(default, deserialize_with = "count")]
    pub total: u64,
    #[serde(default, deserialize_with = "count")]
    pub presents: u64,
    #[serde(default)]
    pub data: Vec<AdminPresenceRowModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRowModel {
    #[serde(deserialize_with = "calendar_day")]
    pub date: NaiveDate,
    pub present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryPayload {
    #[serde(default)]
    pub data: Vec<HistoryRowModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatsModel {
    pub service: String,
    #[serde(default, deserialize_with = "count")]
    pub total: u64,
    #[serde(default, deserialize_with = "count")]
    pub presents: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStatsPayload {
    #[serde(default)]
    pub stats: Vec<ServiceStatsModel>,
}

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Aggregates may come back as JSON strings (`"12"`) rather than numbers
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) if f >= 0.0 => Ok(f.round() as u64),
        Raw::Float(f) => Err(serde::de::Error::custom(format!("negative count: {f}"))),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.max(0.0).round() as u64)
            .map_err(serde::de::Error::custom),
        Raw::Null(()) => Ok(0),
    }
}

/// Accepts `YYYY-MM-DD` as well as full timestamps
fn calendar_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
