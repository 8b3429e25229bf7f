//! The resolved description of one invocation.

/// Immutable description of one call: which module, type, and method, and the
/// optional JSON payload for the method's parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    module: String,
    type_name: String,
    method: String,
    payload: Option<String>,
}

impl InvocationRequest {
    /// Creates a request.
    ///
    /// `module` is the module's base name without extension and `type_name`
    /// is the dotted, namespace-qualified type name.
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        type_name: impl Into<String>,
        method: impl Into<String>,
        payload: Option<String>,
    ) -> Self {
        Self {
            module: module.into(),
            type_name: type_name.into(),
            method: method.into(),
            payload,
        }
    }

    /// Returns the module base name.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the qualified type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the JSON payload text, if one was supplied.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}
