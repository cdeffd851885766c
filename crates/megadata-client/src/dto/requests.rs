//! Request bodies sent to the backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use megadata_core::{AttendanceRecord, MemberId, NewMember, Role};

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or phone number
    #[validate(length(min = 3, message = "Login must be at least 3 characters"))]
    pub login: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3 to 20 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub nom: String,
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub prenom: String,
    #[validate(length(min = 2, message = "Branch must be at least 2 characters"))]
    pub branche: String,
}

/// Letters, digits and underscores only
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username");
        err.message = Some("Only letters, digits and underscores are allowed".into());
        Err(err)
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("nom", &self.nom)
            .field("prenom", &self.prenom)
            .field("branche", &self.branche)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub nom: String,
    pub prenom: String,
    pub numero: String,
    pub quartier: String,
    pub service: String,
}

impl From<&NewMember> for CreateMemberRequest {
    fn from(form: &NewMember) -> Self {
        Self {
            nom: form.last_name.clone(),
            prenom: form.first_name.clone(),
            numero: form.phone.clone(),
            quartier: form.neighborhood.clone(),
            service: form.service.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// One member's presence for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPresenceRequest {
    pub membre_id: MemberId,
    pub date: NaiveDate,
    pub present: bool,
    /// Empty when present
    #[serde(default)]
    pub commentaire: String,
}

impl From<&AttendanceRecord> for RecordPresenceRequest {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            membre_id: record.member_id,
            date: record.date,
            present: record.present,
            commentaire: record.comment.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllRequest {
    pub date: NaiveDate,
}
