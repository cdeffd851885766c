//! Tracing and logging setup
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! overrides the configured level.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Subscriber options for the command-line client
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when `RUST_LOG` is unset
    pub level: Level,
    /// One JSON object per event instead of text lines
    pub json: bool,
    /// Log span open/close (request timings)
    pub span_events: bool,
    /// File, line and target of each event
    pub source_location: bool,
}

impl TracingConfig {
    /// Warnings only, without source locations
    #[must_use]
    pub fn cli(json: bool) -> Self {
        Self {
            level: Level::WARN,
            json,
            span_events: false,
            source_location: false,
        }
    }

    /// Same output, at debug level with span timings
    #[must_use]
    pub fn verbose(self) -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            ..self
        }
    }
}

/// Install the global subscriber
///
/// Fails without panicking when a subscriber is already installed.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let text = (!config.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .with_target(config.source_location)
            .with_span_events(span_events.clone())
    });
    let json = config.json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .with_target(config.source_location)
            .with_span_events(span_events)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text)
        .with(json)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
