//! Binding the JSON payload to the resolved method's parameter.
//!
//! The binder only decides *whether* to bind. Conversion, including
//! case-insensitive key matching, belongs to the parameter's own binder in
//! `dotcall-module`.

use dotcall_module::{Argument, BindError, ParameterDefinition};
use tracing::debug;

/// Binds `payload` to `parameter`.
///
/// Returns `Ok(None)` for methods without a parameter; a supplied payload is
/// then ignored. When the method has a parameter, an absent payload binds as
/// JSON `null`.
///
/// # Errors
///
/// Returns [`BindError`] when the payload is not valid JSON or does not
/// convert to the parameter type.
pub fn bind(
    payload: Option<&str>,
    parameter: Option<&ParameterDefinition>,
) -> Result<Option<Argument>, BindError> {
    let Some(parameter) = parameter else {
        if payload.is_some() {
            debug!("method takes no parameters; ignoring the supplied payload");
        }
        return Ok(None);
    };

    debug!(
        parameter = parameter.name(),
        parameter_type = parameter.type_name(),
        supplied = payload.is_some(),
        "binding payload"
    );
    parameter.bind(payload).map(Some)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Coordinates {
        latitude: i32,
        longitude: i32,
    }

    fn parameter() -> ParameterDefinition {
        ParameterDefinition::of::<Coordinates>("position")
    }

    fn unbox(argument: Argument) -> Coordinates {
        *argument
            .downcast::<Coordinates>()
            .expect("argument has the parameter type")
    }

    #[rstest]
    #[case::no_payload(None)]
    #[case::ignored_payload(Some("this is not even JSON"))]
    fn parameterless_method_binds_nothing(#[case] payload: Option<&str>) {
        let bound = bind(payload, None).expect("nothing to bind");
        assert!(bound.is_none());
    }

    #[rstest]
    #[case::exact(r#"{"latitude": 51, "longitude": 0}"#)]
    #[case::folded(r#"{"Latitude": 51, "LONGITUDE": 0}"#)]
    fn payload_binds_to_parameter(#[case] payload: &str) {
        let bound = bind(Some(payload), Some(&parameter()))
            .expect("payload binds")
            .expect("argument produced");
        assert_eq!(
            unbox(bound),
            Coordinates {
                latitude: 51,
                longitude: 0
            }
        );
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let error = bind(Some("{\"latitude\": "), Some(&parameter()))
            .err()
            .expect("malformed payload fails");
        assert!(matches!(error, BindError::Syntax { .. }), "{error:?}");
    }

    #[test]
    fn absent_payload_binds_null() {
        let optional = ParameterDefinition::of::<Option<Coordinates>>("position");
        let bound = bind(None, Some(&optional))
            .expect("null binds to an option")
            .expect("argument produced");
        let value = bound
            .downcast::<Option<Coordinates>>()
            .expect("argument has the parameter type");
        assert!(value.is_none());
    }

    #[test]
    fn absent_payload_fails_for_required_struct() {
        let error = bind(None, Some(&parameter()))
            .err()
            .expect("null does not convert to a struct");
        assert_eq!(error.fragment(), "<absent>");
    }
}
