//! Error types for the SSO login flow.

use thiserror::Error;

use crate::rest::RequestError;
use crate::schema::SchemaError;
use crate::scrape::ParseError;

/// Errors that abort a login. None of them are retried.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password was empty; no request was made.
    #[error("missing credentials: both username and password are required\n  Suggestion: pass --username/--password or set them in the config file")]
    MissingCredentials,

    /// The login page did not contain the anti-forgery token.
    #[error("login page at {url} did not contain a CSRF token")]
    CsrfTokenNotFound {
        /// The login page URL.
        url: String,
    },

    /// The credential response carried no SSO ticket. Wrong credentials end here too,
    /// since the server answers them with the login page again.
    #[error("no SSO ticket in login response from {url}\n  Suggestion: check username and password")]
    TicketNotFound {
        /// The URL the credentials were posted to.
        url: String,
    },

    /// The SSO host answered the credential POST with HTTP 429.
    #[error("rate limited by {url} while submitting credentials (HTTP 429)\n  Suggestion: wait before logging in again")]
    RateLimited {
        /// The URL that returned 429.
        url: String,
    },

    /// A login request failed at the transport or HTTP level.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// An embedded profile blob was missing or malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A profile blob lacked a required field.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl AuthError {
    /// Creates a missing-token error.
    pub fn csrf_token_not_found(url: impl Into<String>) -> Self {
        Self::CsrfTokenNotFound { url: url.into() }
    }

    /// Creates a missing-ticket error.
    pub fn ticket_not_found(url: impl Into<String>) -> Self {
        Self::TicketNotFound { url: url.into() }
    }

    /// Creates a rate-limited error.
    pub fn rate_limited(url: impl Into<String>) -> Self {
        Self::RateLimited { url: url.into() }
    }
}
