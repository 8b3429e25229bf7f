use crate::logging::LogFormat;

/// Environment variable that enables diagnostic output.
pub const LOG_ENV: &str = "DOTCALL_LOG";

/// Environment variable holding the diagnostic filter expression.
pub const LOG_FILTER_ENV: &str = "DOTCALL_LOG_FILTER";

/// Environment variable selecting the diagnostic output format.
pub const LOG_FORMAT_ENV: &str = "DOTCALL_LOG_FORMAT";

/// Default filter expression used once diagnostics are enabled.
pub const DEFAULT_LOG_FILTER: &str = "debug";

/// Default filter expression used once diagnostics are enabled.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default diagnostic output format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
