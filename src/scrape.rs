//! Extraction of values the login pages embed in HTML.
//!
//! The landing page after SSO publishes the viewer's profile as JavaScript
//! assignments rather than through an API:
//!
//! ```text
//! VIEWER_USERPREFERENCES = {"displayName":"runner42", ...};
//! ```
//!
//! [`extract_embedded_json`] finds the assignment for a variable name on a
//! single line, unescapes `\"` and decodes the object. Anything other than a
//! clean match and a valid JSON object is an error; nothing is guessed.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Anti-forgery token in the login form: `name="_csrf" value="TOKEN"`.
pub(crate) static CSRF_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"name="_csrf"\s+value="(\w+)""#));

/// One-time SSO ticket in the credential response: `?ticket=TICKET`.
pub(crate) static TICKET_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"\?ticket=([\w-]+)"));

/// Errors raised while extracting embedded JSON.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No `VARNAME = {...};` assignment was found.
    #[error("embedded JSON variable '{variable}' not found in page")]
    NotFound {
        /// The variable that was searched for.
        variable: String,
    },

    /// The captured text was not valid JSON.
    #[error("embedded JSON variable '{variable}' is malformed: {source}")]
    InvalidJson {
        /// The variable whose value failed to decode.
        variable: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    fn not_found(variable: &str) -> Self {
        Self::NotFound {
            variable: variable.to_string(),
        }
    }

    fn invalid_json(variable: &str, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            variable: variable.to_string(),
            source,
        }
    }
}

/// Extracts the JSON object assigned to `variable` in `html`.
///
/// The match is line-oriented: the object must open and close (`};`) on the
/// line that carries the assignment. The longest such object on that line wins.
///
/// # Errors
///
/// Returns [`ParseError::NotFound`] when no assignment exists and
/// [`ParseError::InvalidJson`] when the captured text is not valid JSON.
pub fn extract_embedded_json(html: &str, variable: &str) -> Result<Value, ParseError> {
    let pattern = format!(r"(?m){} = (\{{.*\}});", regex::escape(variable));
    let re = Regex::new(&pattern).map_err(|_| ParseError::not_found(variable))?;
    let captured = re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ParseError::not_found(variable))?;

    let json_text = captured.as_str().replace("\\\"", "\"");
    serde_json::from_str(&json_text).map_err(|e| ParseError::invalid_json(variable, e))
}

/// Returns the first capture group of `re` in `text`.
pub(crate) fn capture_first<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Compiles a regex that is a literal in this crate.
///
/// # Panics
///
/// Panics if `pattern` is invalid; all callers pass static patterns covered by tests.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}
