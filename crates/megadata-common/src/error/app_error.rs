//! Application error types
//!
//! Unified error handling for the client side of the application.

use megadata_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Not signed in")]
    NoSession,

    #[error("Access denied: insufficient permissions")]
    Forbidden,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Transport errors
    #[error("The request took too long; the server may be overloaded")]
    Timeout,

    #[error("Cannot reach the server ({base_url}); check your connection")]
    Network { base_url: String },

    #[error("Server error ({status}), please try again later")]
    Server { status: u16 },

    /// Any other non-success response, carrying the backend's own message
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    // Local storage errors
    #[error("Session storage error: {0}")]
    Storage(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Map a non-success HTTP status and the backend's message
    #[must_use]
    pub fn from_status(status: u16, message: Option<String>, path: &str) -> Self {
        match status {
            401 => Self::SessionExpired,
            403 => Self::Forbidden,
            404 => Self::NotFound(path.to_string()),
            408 => Self::Timeout,
            s if s >= 500 => Self::Server { status: s },
            s => Self::Api {
                status: s,
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "An error occurred".to_string()),
            },
        }
    }

    /// HTTP status this error corresponds to
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) => 400,

            // 401 Unauthorized
            Self::InvalidCredentials | Self::InvalidToken | Self::SessionExpired | Self::NoSession => 401,

            // 403 Forbidden
            Self::Forbidden => 403,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 408 Request Timeout
            Self::Timeout => 408,

            Self::Server { status } | Self::Api { status, .. } => *status,

            // 503 Service Unavailable
            Self::Network { .. } => 503,

            // 500 Internal Server Error
            Self::Decode(_) | Self::Storage(_) | Self::Internal(_) | Self::Config(_) => 500,

            // Map domain errors to appropriate status codes
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_authorization() {
                    403
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else {
                    400
                }
            }
        }
    }

    /// Stable error code
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::NoSession => "NO_SESSION",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Api { .. } => "API_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// The session is gone and the user must sign in again
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::SessionExpired | Self::NoSession
        )
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        let status = self.status_code();
        (400..500).contains(&status)
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        let status = self.status_code();
        (500..600).contains(&status)
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Message safe to show to the person at the keyboard
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(_) | Self::Storage(_) | Self::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error shape printed by the command line in JSON mode
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            status: Some(err.status_code()),
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
