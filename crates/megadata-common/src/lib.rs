//! # megadata-common
//!
//! Shared utilities including configuration, error handling, token decoding, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{canonical_service, Claims, TokenDecoder};
pub use config::{
    ApiConfig, AppConfig, AppSettings, ConfigError, ConfigLayer, Environment, LogConfig,
    SessionConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing_with_config, TracingConfig, TracingError};
