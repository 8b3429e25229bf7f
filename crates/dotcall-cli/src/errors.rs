//! Error types for the CLI runtime.

use thiserror::Error;

use dotcall_config::ConfigError;

use crate::pipeline::InvocationError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("Required input was not supplied: {}", .missing.join(", "))]
    MissingOptions { missing: Vec<&'static str> },
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[from] ConfigError),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl AppError {
    /// Exit status reported for the error.
    ///
    /// Problems with the command line or environment mean the pipeline never
    /// ran (status 1); a failure inside the pipeline reports status 2.
    pub(crate) const fn exit_status(&self) -> u8 {
        match self {
            Self::CliUsage(_) | Self::MissingOptions { .. } | Self::LoadConfiguration(_) => 1,
            Self::Invocation(_) => 2,
        }
    }
}
