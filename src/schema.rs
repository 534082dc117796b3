//! Fail-fast field lookups on decoded JSON documents.
//!
//! Responses are kept as [`serde_json::Value`]; only the handful of fields
//! this crate depends on are looked up, and a missing one is an error rather
//! than a silent `null`.

use serde_json::Value;
use thiserror::Error;

/// An expected field was missing from a decoded response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The field is absent, `null`, or of the wrong type.
    #[error("missing or invalid field '{field}' in {context}")]
    MissingField {
        /// Dotted path of the field, e.g. `summaryDTO.startTimeLocal`.
        field: String,
        /// Which document was being read.
        context: String,
    },
}

impl SchemaError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing_field(field: &str, context: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        }
    }
}

/// Looks up a string at a dotted `path` (`"a.b.c"`).
///
/// # Errors
///
/// Returns [`SchemaError::MissingField`] if any segment is missing or the
/// final value is not a string.
pub fn require_str<'v>(value: &'v Value, path: &str, context: &str) -> Result<&'v str, SchemaError> {
    lookup(value, path)
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::missing_field(path, context))
}

/// Looks up an identifier that may be encoded as a JSON number or string and
/// returns its string form.
///
/// # Errors
///
/// Returns [`SchemaError::MissingField`] if the field is missing or neither
/// an integer nor a non-empty string.
pub fn require_id(value: &Value, path: &str, context: &str) -> Result<String, SchemaError> {
    match lookup(value, path) {
        Some(Value::Number(number)) if number.is_u64() || number.is_i64() => Ok(number.to_string()),
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        _ => Err(SchemaError::missing_field(path, context)),
    }
}

fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}
