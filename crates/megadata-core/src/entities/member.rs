//! Member entity - a church member registered into a service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::DomainError;
use crate::value_objects::{MemberId, UserId};

/// Church member as held by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub neighborhood: String,
    pub service: String,
    pub registered_by: Option<UserId>,
    /// Username of the registering account, when the backend joins it in
    pub registered_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// "Prénom Nom" as shown on rosters
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Neighborhood label, with a placeholder when left blank
    pub fn neighborhood_label(&self) -> &str {
        let trimmed = self.neighborhood.trim();
        if trimmed.is_empty() {
            "Non spécifié"
        } else {
            trimmed
        }
    }
}

/// Registration form for a new member
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewMember {
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,

    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(length(min = 2, message = "Neighborhood must be at least 2 characters"))]
    pub neighborhood: String,

    #[validate(length(min = 1, message = "Service is required"))]
    pub service: String,
}

impl NewMember {
    /// Trim every field, then run the form rules
    pub fn normalized(self) -> Result<Self, DomainError> {
        let form = Self {
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            neighborhood: self.neighborhood.trim().to_string(),
            service: self.service.trim().to_string(),
        };
        form.validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        Ok(form)
    }
}

/// Digits, `+`, spaces and dashes only
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let valid = !phone.is_empty()
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c.is_whitespace());
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone number".into());
        Err(err)
    }
}
