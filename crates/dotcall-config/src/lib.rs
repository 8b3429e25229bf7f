//! Shared configuration for the `dotcall` command-line tool.
//!
//! Configuration is read once at startup from the process environment and is
//! immutable afterwards. The diagnostic switch follows boolean parsing rules:
//! `true` or `false` in any letter case, surrounding whitespace ignored. Any
//! other value, or no value at all, leaves diagnostics disabled.
//!
//! The search root is the directory in which modules are located; the CLI
//! uses the process working directory.

mod defaults;
mod logging;

use std::env;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, LOG_ENV, LOG_FILTER_ENV, LOG_FORMAT_ENV, default_log_filter,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    diagnostics: bool,
    log_filter: String,
    log_format: LogFormat,
    search_root: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diagnostics: false,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            search_root: Utf8PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads configuration from the process environment, using the current
    /// working directory as the search root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the working directory cannot be read or is
    /// not valid UTF-8.
    pub fn from_env() -> Result<Self, ConfigError> {
        let working_directory =
            env::current_dir().map_err(|source| ConfigError::WorkingDirectory { source })?;
        let search_root = Utf8PathBuf::from_path_buf(working_directory)
            .map_err(|path| ConfigError::NonUtf8Root { path })?;
        Ok(Self::from_lookup(|key| env::var(key).ok(), search_root))
    }

    /// Builds configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F, search_root: Utf8PathBuf) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let diagnostics = parse_flag(lookup(LOG_ENV).as_deref());
        let log_filter = lookup(LOG_FILTER_ENV)
            .map(|filter| filter.trim().to_owned())
            .filter(|filter| !filter.is_empty())
            .unwrap_or_else(|| default_log_filter().to_owned());
        let log_format = lookup(LOG_FORMAT_ENV)
            .and_then(|format| format.trim().parse::<LogFormat>().ok())
            .unwrap_or_else(default_log_format);

        Self {
            diagnostics,
            log_filter,
            log_format,
            search_root,
        }
    }

    /// Replaces the search root.
    #[must_use]
    pub fn with_search_root(mut self, search_root: impl Into<Utf8PathBuf>) -> Self {
        self.search_root = search_root.into();
        self
    }

    /// Enables or disables diagnostic output.
    #[must_use]
    pub const fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Returns `true` when diagnostic output is enabled.
    #[must_use]
    pub const fn diagnostics_enabled(&self) -> bool {
        self.diagnostics
    }

    /// Returns the `tracing` filter expression used for diagnostics.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the diagnostic output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the directory under which modules are located.
    #[must_use]
    pub fn search_root(&self) -> &Utf8Path {
        &self.search_root
    }
}

/// Parses a boolean switch, treating anything unrecognised as disabled.
#[must_use]
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The working directory could not be determined.
    #[error("failed to read the working directory: {source}")]
    WorkingDirectory {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The working directory is not valid UTF-8.
    #[error("working directory '{}' is not valid UTF-8", .path.display())]
    NonUtf8Root {
        /// The offending path.
        path: PathBuf,
    },
}
