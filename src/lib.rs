//! Garmin Connect Core Library
//!
//! This library signs in to Garmin Connect through its web single-sign-on
//! flow and downloads a user's daily health statistics and activities.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`rest`] - Cookie-carrying HTTP session and endpoint-scoped REST clients
//! - [`connect`] - The Garmin hosts and service routes, wired onto one session
//! - [`scrape`] - Extraction of JSON blobs embedded in HTML pages
//! - [`schema`] - Required-field lookups on decoded responses
//! - [`auth`] - The SSO login flow producing an [`AuthContext`]
//! - [`fetch`] - The paced, sequential per-day fetch loop
//! - [`store`] - Writing downloaded documents to disk
//! - [`collate`] - Regrouping downloads into per-day records

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod collate;
pub mod connect;
pub mod fetch;
pub mod rest;
pub mod schema;
pub mod scrape;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use auth::{AuthContext, AuthError, AuthFlow, Credentials};
pub use collate::{DayRecord, collate};
pub use connect::GarminConnect;
pub use fetch::{ActivitySearch, DailyStat, FetchError, FetchUnit, Fetcher, PAGE_DELAY};
pub use rest::{Endpoint, RequestError, RestClient, Session};
pub use schema::SchemaError;
pub use scrape::ParseError;
pub use store::{JsonStore, StoreError};
