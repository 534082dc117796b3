//! Error types for the REST session client.
//!
//! Every variant carries the URL it failed on so a failed range fetch can be
//! traced back to the exact day or activity that broke it.

use thiserror::Error;

/// Errors that can occur while issuing requests through a [`RestClient`](super::RestClient).
#[derive(Debug, Error)]
pub enum RequestError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The builder error reported by reqwest.
        #[source]
        source: reqwest::Error,
    },

    /// A composed URL (or a base URL handed to an endpoint) failed to parse.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Transport-level failure (DNS, connection refused, TLS, body read).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    InvalidJson {
        /// The URL whose body failed to decode.
        url: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// Creates a client-construction error.
    pub fn client_build(source: reqwest::Error) -> Self {
        Self::ClientBuild { source }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    ///
    /// The URL reqwest attaches to `source` is stripped; `url` replaces it.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source: source.without_url(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a JSON decoding error.
    pub fn invalid_json(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            url: url.into(),
            source,
        }
    }

    /// Returns the HTTP status when this error came from a non-2xx response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Like the download errors this is modelled on, there is no `From<reqwest::Error>`:
// every variant needs the URL, which the source error does not reliably carry.
