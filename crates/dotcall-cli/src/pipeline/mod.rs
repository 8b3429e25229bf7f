//! The invocation pipeline: locate, load, resolve, bind, invoke.
//!
//! [`InvocationPipeline::run`] executes the stages in order and stops at the
//! first failure. There is no retry and nothing to roll back. The loaded
//! module is owned by the run and released when it ends; the constructed
//! instance is dropped first, then the registry, then the library.
//!
//! Errors raised by module code (payload binding and method failures) are
//! rendered to text while the library is still loaded, so an
//! [`InvocationError`] never refers to memory owned by the module.

use camino::{Utf8Path, Utf8PathBuf};
use dotcall_config::Config;
use dotcall_module::{BindError, InvokeError};
use serde_json::Value;
use strum::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::binder;
use crate::loader::{LoadError, ModuleLoader};
use crate::locator::{LocateError, ModuleLocator};
use crate::request::InvocationRequest;
use crate::target::{self, ResolveError, ResolvedMember};

/// Terminal failure states of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// No descendant directory holds the module.
    ModuleNotFound,
    /// The first directory with a match holds several.
    ModuleAmbiguous,
    /// A directory could not be read during the search.
    SearchFailed,
    /// The located file could not be loaded as a module.
    LoadFailed,
    /// The module does not define the type.
    TypeNotFound,
    /// The type's constructor failed.
    ConstructionFailed,
    /// The type has no method with the requested name.
    MethodNotFound,
    /// The method declares more than one parameter.
    UnsupportedArity,
    /// The payload did not bind to the parameter.
    MalformedPayload,
    /// The method was called and failed.
    InvocationFailed,
}

/// Errors raised by [`InvocationPipeline::run`].
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Locating the module failed.
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// Loading the module failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Resolving the type or method failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The payload could not be bound to the method's parameter.
    #[error(
        "malformed payload for parameter '{parameter}' of '{type_name}.{method}': {message} (payload `{fragment}`)"
    )]
    MalformedPayload {
        /// Qualified type name.
        type_name: String,
        /// Method name.
        method: String,
        /// Declared parameter name.
        parameter: String,
        /// Rust type of the parameter.
        parameter_type: String,
        /// Offending payload text.
        fragment: String,
        /// Description of the conversion failure.
        message: String,
    },

    /// The method was invoked and reported a failure.
    #[error("method '{type_name}.{method}' failed: {message}")]
    InvocationFailed {
        /// Qualified type name.
        type_name: String,
        /// Method name.
        method: String,
        /// Failure reported by the method.
        message: String,
    },
}

impl InvocationError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Locate(LocateError::NotFound { .. }) => FailureKind::ModuleNotFound,
            Self::Locate(LocateError::Ambiguous { .. }) => FailureKind::ModuleAmbiguous,
            Self::Locate(LocateError::Io { .. }) => FailureKind::SearchFailed,
            Self::Load(_) => FailureKind::LoadFailed,
            Self::Resolve(ResolveError::TypeNotFound { .. }) => FailureKind::TypeNotFound,
            Self::Resolve(ResolveError::ConstructionFailed { .. }) => {
                FailureKind::ConstructionFailed
            }
            Self::Resolve(ResolveError::MethodNotFound { .. }) => FailureKind::MethodNotFound,
            Self::Resolve(ResolveError::UnsupportedArity { .. }) => FailureKind::UnsupportedArity,
            Self::MalformedPayload { .. } => FailureKind::MalformedPayload,
            Self::InvocationFailed { .. } => FailureKind::InvocationFailed,
        }
    }

    fn malformed(member: &ResolvedMember<'_>, source: &BindError) -> Self {
        Self::MalformedPayload {
            type_name: member.type_name().to_owned(),
            method: member.method().name().to_owned(),
            parameter: member
                .parameter()
                .map(|parameter| parameter.name().to_owned())
                .unwrap_or_default(),
            parameter_type: source.type_name().to_owned(),
            fragment: source.fragment().to_owned(),
            message: source.to_string(),
        }
    }

    fn failed(member: &ResolvedMember<'_>, source: &InvokeError) -> Self {
        Self::InvocationFailed {
            type_name: member.type_name().to_owned(),
            method: member.method().name().to_owned(),
            message: source.to_string(),
        }
    }
}

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome {
    module_path: Utf8PathBuf,
    value: Value,
}

impl InvocationOutcome {
    /// Returns the path of the module that was invoked.
    #[must_use]
    pub fn module_path(&self) -> &Utf8Path {
        &self.module_path
    }

    /// Returns the method's return value; `null` for unit returns.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// Orchestrates one invocation.
#[derive(Debug)]
pub struct InvocationPipeline<L> {
    locator: ModuleLocator,
    loader: L,
    search_root: Utf8PathBuf,
}

impl<L: ModuleLoader> InvocationPipeline<L> {
    /// Creates a pipeline searching the configured root with the platform's
    /// default module extension.
    #[must_use]
    pub fn new(config: &Config, loader: L) -> Self {
        Self {
            locator: ModuleLocator::default(),
            loader,
            search_root: config.search_root().to_owned(),
        }
    }

    /// Replaces the module locator.
    #[must_use]
    pub fn with_locator(mut self, locator: ModuleLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Returns the directory modules are searched below.
    #[must_use]
    pub fn search_root(&self) -> &Utf8Path {
        &self.search_root
    }

    /// Runs the request through every stage.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] describing the first stage that failed.
    pub fn run(&self, request: &InvocationRequest) -> Result<InvocationOutcome, InvocationError> {
        self.execute(request).inspect_err(|error| {
            warn!(kind = %error.kind(), %error, "invocation failed");
        })
    }

    fn execute(&self, request: &InvocationRequest) -> Result<InvocationOutcome, InvocationError> {
        debug!(
            module = request.module(),
            type_name = request.type_name(),
            method = request.method(),
            root = %self.search_root,
            "starting invocation"
        );

        let module_path = self.locator.find(&self.search_root, request.module())?;
        info!(path = %module_path, "module located");

        let module = self.loader.load(&module_path)?;
        let mut member = target::resolve(
            module.definition(),
            request.type_name(),
            request.method(),
        )?;

        let argument = binder::bind(request.payload(), member.parameter())
            .map_err(|source| InvocationError::malformed(&member, &source))?;

        let value = member
            .invoke(argument)
            .map_err(|source| InvocationError::failed(&member, &source))?;
        info!(
            type_name = member.type_name(),
            method = member.method().name(),
            result = %value,
            "method returned"
        );

        Ok(InvocationOutcome { module_path, value })
    }
}
