//! `SampleLib`: a small dotcall module used by the test suite and as an
//! authoring reference.
//!
//! dotcall looks for `<module>.<ext>` in the subdirectories of the working
//! directory, where `<ext>` is the platform's library extension. Cargo names
//! the built artefact after the library target instead (for example
//! `target/debug/libsamplelib.so`), so copy it to `<dir>/SampleLib.<ext>`
//! before calling it:
//!
//! ```text
//! cargo build -p dotcall-sample
//! mkdir -p modules && cp target/debug/libsamplelib.so modules/SampleLib.so
//! DOTCALL_LOG=true dotcall -a SampleLib -c Sample.Greeter -m Greet -d '{"Name":"Ada"}'
//! ```

use std::convert::Infallible;

use dotcall_module::{
    DefinitionError, MethodDefinition, ModuleDefinition, TypeDefinition, export_module,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Module name reported by [`definition`].
pub const MODULE_NAME: &str = "SampleLib";

/// Request accepted by `Sample.Greeter.Greet`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GreetRequest {
    /// Who to greet.
    pub name: String,
}

/// Reply produced by `Sample.Greeter.Greet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Greeting {
    /// Rendered greeting.
    pub message: String,
    /// Number of greetings this instance has produced.
    pub count: u32,
}

/// Greets people by name.
#[derive(Debug, Default)]
pub struct Greeter {
    greeted: u32,
}

impl Greeter {
    /// Produces a greeting for the requested name.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn greet(&mut self, request: GreetRequest) -> Result<Greeting, Infallible> {
        self.greeted = self.greeted.saturating_add(1);
        Ok(Greeting {
            message: format!("Hello, {}!", request.name),
            count: self.greeted,
        })
    }

    /// Answers a liveness check.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub const fn ping(&mut self) -> Result<&'static str, Infallible> {
        Ok("pong")
    }

    /// Introduces two people. Declared with two parameters, so `dotcall`
    /// refuses to call it.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn introduce(&mut self, first: String, second: String) -> Result<String, Infallible> {
        Ok(format!("{first}, meet {second}."))
    }
}

/// Operands for `Sample.Math.Calculator.Divide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DivideRequest {
    /// Value being divided.
    pub dividend: i64,
    /// Value to divide by.
    pub divisor: i64,
}

/// Failures reported by [`Calculator`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    /// The divisor was zero.
    #[error("cannot divide {dividend} by zero")]
    DivisionByZero {
        /// Value that was being divided.
        dividend: i64,
    },
    /// The result does not fit in a 64-bit integer.
    #[error("result of the operation overflows")]
    Overflow,
}

/// Integer arithmetic.
#[derive(Debug, Default)]
pub struct Calculator;

impl Calculator {
    /// Divides the request's dividend by its divisor, truncating.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError`] for a zero divisor or on overflow.
    pub fn divide(&mut self, request: DivideRequest) -> Result<i64, CalculatorError> {
        if request.divisor == 0 {
            return Err(CalculatorError::DivisionByZero {
                dividend: request.dividend,
            });
        }
        request
            .dividend
            .checked_div(request.divisor)
            .ok_or(CalculatorError::Overflow)
    }

    /// Squares a number.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::Overflow`] when the square does not fit.
    pub fn square(&mut self, value: i64) -> Result<i64, CalculatorError> {
        value.checked_mul(value).ok_or(CalculatorError::Overflow)
    }
}

/// Builds the `SampleLib` registry.
///
/// # Errors
///
/// Returns [`DefinitionError`] if the registry is inconsistent.
pub fn definition() -> Result<ModuleDefinition, DefinitionError> {
    ModuleDefinition::builder(MODULE_NAME)
        .with_type(
            TypeDefinition::new::<Greeter>("Sample.Greeter")
                .method(MethodDefinition::unary("Greet", "request", Greeter::greet))
                .method(MethodDefinition::nullary("Ping", Greeter::ping))
                .method(MethodDefinition::binary(
                    "Introduce",
                    ["first", "second"],
                    Greeter::introduce,
                )),
        )
        .with_type(
            TypeDefinition::new::<Calculator>("Sample.Math.Calculator")
                .method(MethodDefinition::unary("Divide", "request", Calculator::divide))
                .method(MethodDefinition::unary("Square", "value", Calculator::square)),
        )
        .build()
}

export_module!(definition);
