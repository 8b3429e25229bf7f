//! JSON payload binding with case-insensitive field matching.
//!
//! Payload keys are matched to the target type's fields ignoring case, at
//! every depth: structs nested in structs, sequences, options, maps and enum
//! variants fold the same way as the top level. The field names come from
//! the type's own `Deserialize` implementation, so `#[serde(rename)]` and
//! `rename_all` attributes are honoured. A struct only binds from a JSON
//! object; arrays are never read positionally into struct fields.

mod folding;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use self::folding::Folding;
use crate::error::BindError;

const ABSENT_PAYLOAD: &str = "<absent>";
const FRAGMENT_RADIUS: usize = 24;
const FRAGMENT_LIMIT: usize = 120;

/// Binds JSON text to a value of type `P`.
///
/// An absent payload binds as JSON `null`, which lets `Option<T>` parameters
/// accept a missing payload.
///
/// # Errors
///
/// Returns [`BindError::Syntax`] when the text is not JSON and
/// [`BindError::Shape`] when the document does not convert to `P`. Both carry
/// the offending fragment.
pub fn bind_payload<P>(payload: Option<&str>) -> Result<P, BindError>
where
    P: DeserializeOwned,
{
    let text = payload.unwrap_or("null");
    let document: Value = serde_json::from_str(text).map_err(|source| {
        let (line, column) = (source.line(), source.column());
        BindError::Syntax {
            type_name: std::any::type_name::<P>(),
            fragment: fragment_at(payload, line, column),
            line,
            column,
            source,
        }
    })?;

    bind_value::<P>(document).map_err(|source| BindError::Shape {
        type_name: std::any::type_name::<P>(),
        fragment: shorten(payload),
        source,
    })
}

/// Converts a parsed JSON document to `P`, matching object keys to struct
/// fields case-insensitively at every depth.
///
/// A key that matches a field exactly always wins over one that only matches
/// after case folding.
///
/// # Errors
///
/// Returns the `serde_json` conversion error when the document does not fit,
/// including when a struct is expected and the document is not an object.
pub fn bind_value<P>(document: Value) -> Result<P, serde_json::Error>
where
    P: DeserializeOwned,
{
    P::deserialize(Folding::new(document))
}

fn fragment_at(payload: Option<&str>, line: usize, column: usize) -> String {
    let Some(text) = payload else {
        return ABSENT_PAYLOAD.to_owned();
    };
    if line == 0 {
        return shorten(payload);
    }

    let line_text = text.lines().nth(line.saturating_sub(1)).unwrap_or(text);
    let chars: Vec<char> = line_text.chars().collect();
    let centre = column.saturating_sub(1).min(chars.len());
    let start = centre.saturating_sub(FRAGMENT_RADIUS);
    let end = centre.saturating_add(FRAGMENT_RADIUS).min(chars.len());
    chars
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

fn shorten(payload: Option<&str>) -> String {
    let Some(text) = payload else {
        return ABSENT_PAYLOAD.to_owned();
    };
    if text.chars().count() <= FRAGMENT_LIMIT {
        return text.to_owned();
    }
    let mut shortened: String = text.chars().take(FRAGMENT_LIMIT).collect();
    shortened.push('…');
    shortened
}
