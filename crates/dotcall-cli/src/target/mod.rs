//! Resolution of the type and method an invocation names.
//!
//! [`resolve`] walks a loaded [`ModuleDefinition`]: it finds the type by
//! qualified name, constructs an instance, finds the method by exact name,
//! and refuses methods that declare more than one parameter. Nothing is bound
//! or called here.

use dotcall_module::{
    Argument, Instance, InvokeError, MethodDefinition, MethodFailure, ModuleDefinition,
    ParameterDefinition, TypeDefinition,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Largest number of parameters an invocable method may declare.
pub const MAX_ARITY: usize = 1;

/// Errors raised while resolving the invocation target.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The module does not define the requested type.
    #[error(
        "type '{type_name}' is not defined in module '{module}'; available types: {}",
        list_or_none(.available)
    )]
    TypeNotFound {
        /// Qualified type name that was requested.
        type_name: String,
        /// Name of the module that was searched.
        module: String,
        /// Every type the module defines, sorted.
        available: Vec<String>,
    },

    /// The type's parameterless constructor failed.
    ///
    /// The constructor's error is rendered to text straight away because its
    /// code lives in the module library.
    #[error("failed to construct an instance of '{type_name}': {message}")]
    ConstructionFailed {
        /// Qualified type name.
        type_name: String,
        /// Failure reported by the constructor.
        message: String,
    },

    /// The type has no method with the requested name.
    #[error(
        "method '{method}' was not found on type '{type_name}'; available methods: {}",
        list_or_none(.available)
    )]
    MethodNotFound {
        /// Qualified type name.
        type_name: String,
        /// Method name that was requested.
        method: String,
        /// Methods the type declares, in registration order.
        available: Vec<String>,
    },

    /// The method declares more parameters than can be supplied.
    #[error(
        "method '{method}' on type '{type_name}' declares {arity} parameters; at most one is supported"
    )]
    UnsupportedArity {
        /// Qualified type name.
        type_name: String,
        /// Method name.
        method: String,
        /// Number of parameters the method declares.
        arity: usize,
    },
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(", ")
    }
}

/// A type, one of its methods, and a freshly constructed receiver.
///
/// The method always belongs to the type and declares at most one parameter.
pub struct ResolvedMember<'m> {
    type_definition: &'m TypeDefinition,
    method: &'m MethodDefinition,
    instance: Instance,
}

impl ResolvedMember<'_> {
    /// Returns the qualified type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.type_definition.name()
    }

    /// Returns the resolved method.
    #[must_use]
    pub const fn method(&self) -> &MethodDefinition {
        self.method
    }

    /// Returns the method's only parameter, if it declares one.
    #[must_use]
    pub fn parameter(&self) -> Option<&ParameterDefinition> {
        self.method.parameters().first()
    }

    /// Calls the method on the constructed instance.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the method fails or the argument does not
    /// match the declared parameter.
    pub fn invoke(&mut self, argument: Option<Argument>) -> Result<Value, InvokeError> {
        let arguments = argument.into_iter().collect();
        self.method.invoke(self.instance.as_mut(), arguments)
    }
}

impl std::fmt::Debug for ResolvedMember<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMember")
            .field("type_name", &self.type_name())
            .field("method", &self.method.name())
            .finish_non_exhaustive()
    }
}

/// Resolves `type_name` and `method` within `module`.
///
/// # Errors
///
/// Returns [`ResolveError`] when the type or method is missing, the
/// constructor fails, or the method declares more than one parameter.
pub fn resolve<'m>(
    module: &'m ModuleDefinition,
    type_name: &str,
    method: &str,
) -> Result<ResolvedMember<'m>, ResolveError> {
    let type_definition =
        module
            .find_type(type_name)
            .ok_or_else(|| ResolveError::TypeNotFound {
                type_name: type_name.to_owned(),
                module: module.name().to_owned(),
                available: module.type_names().map(str::to_owned).collect(),
            })?;
    debug!(module = module.name(), type_name, "type resolved");

    let instance = type_definition
        .construct()
        .map_err(|failure: MethodFailure| ResolveError::ConstructionFailed {
            type_name: type_name.to_owned(),
            message: failure.to_string(),
        })?;
    debug!(type_name, "instance constructed");

    let method_definition =
        type_definition
            .find_method(method)
            .ok_or_else(|| ResolveError::MethodNotFound {
                type_name: type_name.to_owned(),
                method: method.to_owned(),
                available: type_definition
                    .methods()
                    .iter()
                    .map(|candidate| candidate.name().to_owned())
                    .collect(),
            })?;

    let arity = method_definition.arity();
    if arity > MAX_ARITY {
        return Err(ResolveError::UnsupportedArity {
            type_name: type_name.to_owned(),
            method: method.to_owned(),
            arity,
        });
    }
    debug!(type_name, method, arity, "method resolved");

    Ok(ResolvedMember {
        type_definition,
        method: method_definition,
        instance,
    })
}
