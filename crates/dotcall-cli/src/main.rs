//! CLI entrypoint for `dotcall`.
//!
//! The binary delegates to [`dotcall_cli::run`], which parses the command
//! line, reads configuration from the environment, and drives one
//! invocation through the pipeline.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    dotcall_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
