//! Error types for the fetch loop.

use thiserror::Error;

use crate::rest::RequestError;
use crate::schema::SchemaError;

/// Errors that abort a range or activity fetch.
///
/// Results accumulated before the failure are dropped with the loop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A request failed (transport, non-2xx status, or undecodable JSON).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A response lacked a field the loop depends on.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl FetchError {
    /// Returns the HTTP status when the failure was a non-2xx response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(error) => error.status(),
            Self::Schema(_) => None,
        }
    }
}
