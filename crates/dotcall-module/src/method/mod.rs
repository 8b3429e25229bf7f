//! Method and parameter descriptors.
//!
//! A [`MethodDefinition`] pairs a name with the descriptors of its formal
//! parameters and a type-erased invoker. The typed constructors
//! ([`MethodDefinition::nullary`], [`MethodDefinition::unary`],
//! [`MethodDefinition::binary`]) capture the receiver and parameter types so
//! the host can call the method with [`Argument`] boxes produced by each
//! [`ParameterDefinition`]'s binder.

use std::any::{Any, type_name};
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::binding::bind_payload;
use crate::error::{BindError, InvokeError, MethodFailure};

/// A constructed receiver, owned by the host for the duration of one call.
pub type Instance = Box<dyn Any>;

/// A bound parameter value.
pub type Argument = Box<dyn Any>;

type Binder = Box<dyn Fn(Option<&str>) -> Result<Argument, BindError> + Send + Sync>;
type Invoker =
    Box<dyn Fn(&str, &mut dyn Any, Vec<Argument>) -> Result<Value, InvokeError> + Send + Sync>;

/// Describes one formal parameter and how to bind it from JSON.
pub struct ParameterDefinition {
    name: String,
    type_name: &'static str,
    binder: Binder,
}

impl ParameterDefinition {
    /// Describes a parameter of type `P`, bound with [`bind_payload`].
    #[must_use]
    pub fn of<P>(name: impl Into<String>) -> Self
    where
        P: DeserializeOwned + 'static,
    {
        Self {
            name: name.into(),
            type_name: type_name::<P>(),
            binder: Box::new(|payload| {
                bind_payload::<P>(payload).map(|value| Box::new(value) as Argument)
            }),
        }
    }

    /// Returns the declared parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the Rust type name of the parameter.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Binds JSON payload text to a value of this parameter's type.
    ///
    /// An absent payload binds as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] when the text is not JSON or does not convert.
    pub fn bind(&self, payload: Option<&str>) -> Result<Argument, BindError> {
        (self.binder)(payload)
    }
}

impl fmt::Debug for ParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDefinition")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A named, invocable method on a registered type.
pub struct MethodDefinition {
    name: String,
    parameters: Vec<ParameterDefinition>,
    return_type: &'static str,
    invoker: Invoker,
}

impl MethodDefinition {
    /// Defines a method taking no parameters.
    #[must_use]
    pub fn nullary<T, R, E, F>(name: impl Into<String>, handler: F) -> Self
    where
        T: 'static,
        R: Serialize + 'static,
        E: Into<MethodFailure> + 'static,
        F: Fn(&mut T) -> Result<R, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: type_name::<R>(),
            invoker: Box::new(move |method, instance, arguments| {
                expect_arguments(method, 0, arguments.len())?;
                let receiver = receiver::<T>(method, instance)?;
                complete(method, handler(receiver))
            }),
        }
    }

    /// Defines a method taking a single parameter of type `P`.
    #[must_use]
    pub fn unary<T, P, R, E, F>(
        name: impl Into<String>,
        parameter: impl Into<String>,
        handler: F,
    ) -> Self
    where
        T: 'static,
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
        E: Into<MethodFailure> + 'static,
        F: Fn(&mut T, P) -> Result<R, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: vec![ParameterDefinition::of::<P>(parameter)],
            return_type: type_name::<R>(),
            invoker: Box::new(move |method, instance, arguments| {
                expect_arguments(method, 1, arguments.len())?;
                let mut arguments = arguments.into_iter();
                let first = argument::<P>(method, &mut arguments, 0)?;
                let receiver = receiver::<T>(method, instance)?;
                complete(method, handler(receiver, first))
            }),
        }
    }

    /// Defines a method taking two parameters.
    ///
    /// Such methods can be registered and listed, but `dotcall` refuses to
    /// invoke them.
    #[must_use]
    pub fn binary<T, P1, P2, R, E, F>(
        name: impl Into<String>,
        parameters: [&str; 2],
        handler: F,
    ) -> Self
    where
        T: 'static,
        P1: DeserializeOwned + 'static,
        P2: DeserializeOwned + 'static,
        R: Serialize + 'static,
        E: Into<MethodFailure> + 'static,
        F: Fn(&mut T, P1, P2) -> Result<R, E> + Send + Sync + 'static,
    {
        let [left, right] = parameters;
        Self {
            name: name.into(),
            parameters: vec![
                ParameterDefinition::of::<P1>(left),
                ParameterDefinition::of::<P2>(right),
            ],
            return_type: type_name::<R>(),
            invoker: Box::new(move |method, instance, arguments| {
                expect_arguments(method, 2, arguments.len())?;
                let mut arguments = arguments.into_iter();
                let first = argument::<P1>(method, &mut arguments, 0)?;
                let second = argument::<P2>(method, &mut arguments, 1)?;
                let receiver = receiver::<T>(method, instance)?;
                complete(method, handler(receiver, first, second))
            }),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formal parameter descriptors in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    /// Returns the number of formal parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Returns the Rust type name of the method's successful return value.
    #[must_use]
    pub const fn return_type(&self) -> &'static str {
        self.return_type
    }

    /// Calls the method on `instance` with already-bound arguments.
    ///
    /// The return value is rendered as JSON; unit returns render as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Failed`] when the method body fails, or another
    /// [`InvokeError`] variant when the receiver or arguments do not match the
    /// declared types.
    pub fn invoke(
        &self,
        instance: &mut dyn Any,
        arguments: Vec<Argument>,
    ) -> Result<Value, InvokeError> {
        (self.invoker)(&self.name, instance, arguments)
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

fn expect_arguments(method: &str, expected: usize, actual: usize) -> Result<(), InvokeError> {
    if expected == actual {
        return Ok(());
    }
    Err(InvokeError::ArgumentCount {
        method: method.to_owned(),
        expected,
        actual,
    })
}

fn receiver<'a, T: 'static>(
    method: &str,
    instance: &'a mut dyn Any,
) -> Result<&'a mut T, InvokeError> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(|| InvokeError::ReceiverMismatch {
            method: method.to_owned(),
            expected: type_name::<T>(),
        })
}

fn argument<P: 'static>(
    method: &str,
    arguments: &mut impl Iterator<Item = Argument>,
    index: usize,
) -> Result<P, InvokeError> {
    let mismatch = || InvokeError::ArgumentMismatch {
        method: method.to_owned(),
        index,
        expected: type_name::<P>(),
    };
    let value = arguments.next().ok_or_else(mismatch)?;
    value
        .downcast::<P>()
        .map(|boxed| *boxed)
        .map_err(|_| mismatch())
}

fn complete<R, E>(method: &str, result: Result<R, E>) -> Result<Value, InvokeError>
where
    R: Serialize,
    E: Into<MethodFailure>,
{
    let value = result.map_err(|error| InvokeError::Failed(error.into()))?;
    serde_json::to_value(value).map_err(|source| InvokeError::SerialiseResult {
        method: method.to_owned(),
        source,
    })
}
