//! Command-line argument definitions for `dotcall`.

use clap::{ArgAction, Parser};

use crate::errors::AppError;
use crate::request::InvocationRequest;

/// Command-line interface for `dotcall`.
#[derive(Parser, Debug)]
#[command(
    name = "dotcall",
    version,
    about = "Locate a module below the working directory and call one of its methods",
    disable_help_flag = true
)]
pub(crate) struct Cli {
    /// The module name, without extension.
    #[arg(short = 'a', long = "assembly", value_name = "ASSEMBLY")]
    pub(crate) assembly: Option<String>,
    /// The fully qualified type name.
    #[arg(short = 'c', long = "class", value_name = "CLASS")]
    pub(crate) class: Option<String>,
    /// The public method name.
    #[arg(short = 'm', long = "method", value_name = "METHOD")]
    pub(crate) method: Option<String>,
    /// JSON input data for the method's parameter.
    #[arg(short = 'd', long = "data", value_name = "DATA")]
    pub(crate) data: Option<String>,
    /// Print help.
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    pub(crate) help: Option<bool>,
}

impl Cli {
    /// Converts the parsed flags into an invocation request.
    ///
    /// Missing required flags are collected so the error names all of them.
    pub(crate) fn into_request(self) -> Result<InvocationRequest, AppError> {
        let mut missing = Vec::new();
        if self.assembly.is_none() {
            missing.push("--assembly");
        }
        if self.class.is_none() {
            missing.push("--class");
        }
        if self.method.is_none() {
            missing.push("--method");
        }

        match (self.assembly, self.class, self.method) {
            (Some(module), Some(type_name), Some(method)) => {
                Ok(InvocationRequest::new(module, type_name, method, self.data))
            }
            _ => Err(AppError::MissingOptions { missing }),
        }
    }
}
