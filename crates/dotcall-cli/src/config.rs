//! Configuration loading for the CLI runtime.

use dotcall_config::Config;

use crate::errors::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration for one run.
    fn load(&self) -> Result<Config, AppError>;
}

/// Reads configuration from the process environment and working directory.
pub(crate) struct EnvConfigLoader;

impl ConfigLoader for EnvConfigLoader {
    fn load(&self) -> Result<Config, AppError> {
        Config::from_env().map_err(AppError::LoadConfiguration)
    }
}
