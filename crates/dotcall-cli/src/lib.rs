//! Command-line runtime for `dotcall`.
//!
//! `dotcall` locates a module library by name below the working directory,
//! loads it, resolves a type and method from the module's exported
//! definition, binds an optional JSON payload to the method's parameter, and
//! invokes it. Every failure is classified and reported on stderr.
//!
//! The stages are exposed individually ([`ModuleLocator`], [`ModuleLoader`],
//! [`resolve`], [`bind`]) and composed by [`InvocationPipeline`]. The runtime
//! in [`run`] adds argument parsing, configuration, telemetry, and exit
//! codes:
//!
//! | Exit code | Meaning |
//! | --- | --- |
//! | 0 | The method returned successfully, or help/version was printed. |
//! | 1 | The command line was unusable or required options were missing. |
//! | 2 | The pipeline failed. |

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

pub mod binder;
mod cli;
mod config;
mod errors;
pub mod loader;
pub mod locator;
pub mod pipeline;
pub mod request;
pub mod target;
pub mod telemetry;

pub use binder::bind;
pub use loader::{DylibLoader, LoadError, LoadedModule, ModuleLoader};
pub use locator::{LocateError, ModuleLocator};
pub use pipeline::{FailureKind, InvocationError, InvocationOutcome, InvocationPipeline};
pub use request::InvocationRequest;
pub use target::{MAX_ARITY, ResolveError, ResolvedMember, resolve};

use cli::Cli;
use config::{ConfigLoader, EnvConfigLoader};
use errors::AppError;

struct CliRunner<'a, W: Write, E: Write, C: ConfigLoader, M: ModuleLoader> {
    stdout: &'a mut W,
    stderr: &'a mut E,
    config_loader: &'a C,
    module_loader: &'a M,
}

impl<W, E, C, M> CliRunner<'_, W, E, C, M>
where
    W: Write,
    E: Write,
    C: ConfigLoader,
    M: ModuleLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(error) if is_informational(error.kind()) => {
                let _ = write!(self.stdout, "{error}");
                return ExitCode::SUCCESS;
            }
            Err(error) => return self.fail(&AppError::CliUsage(error)),
        };

        match self.invoke(cli) {
            Ok(outcome) => {
                debug!(module = %outcome.module_path(), "invocation completed");
                ExitCode::SUCCESS
            }
            Err(error) => self.fail(&error),
        }
    }

    fn invoke(&mut self, cli: Cli) -> Result<InvocationOutcome, AppError> {
        let request = cli.into_request()?;
        let config = self.config_loader.load()?;
        if let Err(error) = telemetry::initialise(&config) {
            let _ = writeln!(self.stderr, "{error}");
        }

        InvocationPipeline::new(&config, self.module_loader)
            .run(&request)
            .map_err(AppError::from)
    }

    fn fail(&mut self, error: &AppError) -> ExitCode {
        let _ = writeln!(self.stderr, "{error}");
        ExitCode::from(error.exit_status())
    }
}

const fn is_informational(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// Modules are searched below the process working directory and loaded as
/// dynamic libraries.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &EnvConfigLoader, &DylibLoader)
}

fn run_with<I, W, E, C, M>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    config_loader: &C,
    module_loader: &M,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    C: ConfigLoader,
    M: ModuleLoader,
{
    CliRunner {
        stdout,
        stderr,
        config_loader,
        module_loader,
    }
    .run(args)
}

#[cfg(test)]
mod tests;
