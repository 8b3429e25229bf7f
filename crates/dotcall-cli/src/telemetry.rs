//! Diagnostic output for the CLI.
//!
//! Diagnostics are `tracing` events emitted unconditionally by every stage of
//! the pipeline. A subscriber is installed only when the configuration enables
//! diagnostics; otherwise the events go nowhere. Error reports never depend on
//! this module: the runner writes them to stderr directly.

use std::io::{self, IsTerminal};

use dotcall_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<bool> = OnceCell::new();

/// Handle returned when telemetry has been configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle {
    active: bool,
}

impl TelemetryHandle {
    /// Returns `true` when a diagnostic subscriber is installed.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.active
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures diagnostic output once per process.
///
/// The first call decides: when diagnostics are disabled no subscriber is
/// installed and later calls report an inactive handle.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter expression is invalid or a
/// global subscriber is already installed by someone else.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|active| TelemetryHandle { active: *active })
}

fn install_subscriber(config: &Config) -> Result<bool, TelemetryError> {
    if !config.diagnostics_enabled() {
        return Ok(false);
    }

    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    Ok(true)
}
