//! Session client for Garmin Connect's browser-facing REST routes.
//!
//! The service has no public API. Requests are made the way the web UI makes
//! them: one cookie-carrying [`Session`] shared by several [`RestClient`]s,
//! each bound to an immutable [`Endpoint`] (host, base route, default headers).
//!
//! # Features
//!
//! - Deterministic URL composition (default ports omitted)
//! - Child endpoints derived by route, inheriting host and headers by copy
//! - Per-call headers layered over endpoint defaults
//! - Non-2xx statuses surfaced as [`RequestError::HttpStatus`]

mod client;
mod endpoint;
mod error;
mod session;

pub use client::{NO_PARAMS, RestClient};
pub(crate) use client::redacted_url;
pub use endpoint::{Endpoint, Protocol};
pub use error::RequestError;
pub use session::Session;
