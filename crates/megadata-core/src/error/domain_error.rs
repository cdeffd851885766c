//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{MemberId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("No attendance sheet loaded")]
    NoSheetLoaded,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Comment can only be set on an absent member ({0})")]
    CommentWhilePresent(MemberId),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("No service assigned to this berger")]
    MissingAssignedService,

    #[error("Members can only be registered for service {expected}")]
    ServiceMismatch { expected: String },

    #[error("Administrators cannot register members")]
    AdminCannotRegister,

    #[error("Role {0} is not allowed to do this")]
    RoleNotAllowed(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("A save is already in progress")]
    SaveInProgress,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Operation cancelled")]
    NotConfirmed,
}

impl DomainError {
    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::NoSheetLoaded => "NO_SHEET_LOADED",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::CommentWhilePresent(_) => "COMMENT_WHILE_PRESENT",

            // Authorization
            Self::MissingAssignedService => "MISSING_ASSIGNED_SERVICE",
            Self::ServiceMismatch { .. } => "SERVICE_MISMATCH",
            Self::AdminCannotRegister => "ADMIN_CANNOT_REGISTER",
            Self::RoleNotAllowed(_) => "ROLE_NOT_ALLOWED",

            // Conflict
            Self::SaveInProgress => "SAVE_IN_PROGRESS",

            // Business Rules
            Self::NotConfirmed => "NOT_CONFIRMED",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MemberNotFound(_) | Self::UserNotFound(_) | Self::NoSheetLoaded
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidRole(_) | Self::CommentWhilePresent(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::MissingAssignedService
                | Self::ServiceMismatch { .. }
                | Self::AdminCannotRegister
                | Self::RoleNotAllowed(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::SaveInProgress)
    }
}
