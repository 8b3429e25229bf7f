//! Errors raised while defining, binding, and invoking module members.
//!
//! All errors use `thiserror`-derived enums with structured context so the
//! host can classify failures without parsing messages.

use thiserror::Error;

/// Error raised by a constructor or method body inside a module.
pub type MethodFailure = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while assembling a [`ModuleDefinition`](crate::ModuleDefinition).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The module was given a blank name.
    #[error("module name must not be empty")]
    EmptyModuleName,

    /// A type was registered with a blank qualified name.
    #[error("module '{module}' declares a type with an empty name")]
    EmptyTypeName {
        /// Module being assembled.
        module: String,
    },

    /// Two types share the same qualified name.
    #[error("module '{module}' declares type '{type_name}' more than once")]
    DuplicateType {
        /// Module being assembled.
        module: String,
        /// Qualified type name that collided.
        type_name: String,
    },

    /// A method was registered with a blank name.
    #[error("type '{type_name}' declares a method with an empty name")]
    EmptyMethodName {
        /// Owning type.
        type_name: String,
    },

    /// Two methods on one type share a name. Overloads are not supported.
    #[error("type '{type_name}' declares method '{method}' more than once")]
    DuplicateMethod {
        /// Owning type.
        type_name: String,
        /// Method name that collided.
        method: String,
    },
}

/// Errors raised while converting a JSON payload into a parameter value.
#[derive(Debug, Error)]
pub enum BindError {
    /// The payload text is not valid JSON.
    #[error(
        "payload is not valid JSON for `{type_name}` at line {line}, column {column}: {source} (near `{fragment}`)"
    )]
    Syntax {
        /// Parameter type the payload was destined for.
        type_name: &'static str,
        /// Offending text around the reported position.
        fragment: String,
        /// One-based line reported by the parser.
        line: usize,
        /// One-based column reported by the parser.
        column: usize,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The payload is valid JSON but does not fit the parameter type.
    #[error("payload does not match `{type_name}`: {source} (payload `{fragment}`)")]
    Shape {
        /// Parameter type the payload was destined for.
        type_name: &'static str,
        /// The payload, shortened when long.
        fragment: String,
        /// Underlying conversion error.
        #[source]
        source: serde_json::Error,
    },
}

impl BindError {
    /// Returns the parameter type the payload failed to bind to.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Syntax { type_name, .. } | Self::Shape { type_name, .. } => type_name,
        }
    }

    /// Returns the offending payload text echoed for diagnosis.
    #[must_use]
    pub fn fragment(&self) -> &str {
        match self {
            Self::Syntax { fragment, .. } | Self::Shape { fragment, .. } => fragment,
        }
    }
}

/// Errors raised while invoking a resolved method.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The caller supplied the wrong number of arguments.
    #[error("method '{method}' expects {expected} argument(s) but received {actual}")]
    ArgumentCount {
        /// Method being invoked.
        method: String,
        /// Declared arity.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },

    /// The receiver is not an instance of the method's owning type.
    #[error("method '{method}' cannot be invoked on a value that is not a `{expected}`")]
    ReceiverMismatch {
        /// Method being invoked.
        method: String,
        /// Rust type the method expects as receiver.
        expected: &'static str,
    },

    /// An argument is not a value of the declared parameter type.
    #[error("argument {index} of method '{method}' is not a `{expected}`")]
    ArgumentMismatch {
        /// Method being invoked.
        method: String,
        /// Zero-based argument position.
        index: usize,
        /// Declared parameter type.
        expected: &'static str,
    },

    /// The method body itself reported a failure.
    #[error("{0}")]
    Failed(#[source] MethodFailure),

    /// The method's return value could not be rendered as JSON.
    #[error("failed to serialise return value of method '{method}': {source}")]
    SerialiseResult {
        /// Method being invoked.
        method: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}
