//! Garmin Connect single-sign-on.
//!
//! [`AuthFlow`] turns [`Credentials`] into an [`AuthContext`] by emulating the
//! browser login: CSRF token, credential POST, ticket exchange, and a scrape
//! of the viewer profile from the landing page.

mod context;
mod error;
mod flow;

pub use context::{AuthContext, Credentials};
pub use error::AuthError;
pub use flow::AuthFlow;
