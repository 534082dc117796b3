//! Shared HTTP session: one connection pool and one cookie jar for every endpoint.

use std::sync::Arc;

use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::instrument;

use super::RequestError;
use crate::user_agent;

/// Reusable connection context carrying cookies across hosts.
///
/// Cloning is cheap and every clone shares the same pool and jar, so the SSO
/// cookies set during login are sent on every later request to the main
/// service. The session is used from a single task; nothing here locks.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    cookies: Arc<Jar>,
}

impl Session {
    /// Creates a session with the browser User-Agent and an empty cookie jar.
    ///
    /// No request timeouts are configured; the transport defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, RequestError> {
        Self::with_user_agent(user_agent::default_session_user_agent())
    }

    /// Creates a session that identifies itself with `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::ClientBuild`] if the HTTP client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_user_agent(user_agent: &str) -> Result<Self, RequestError> {
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_provider(Arc::clone(&cookies))
            .gzip(true)
            .build()
            .map_err(RequestError::client_build)?;
        Ok(Self { client, cookies })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// The cookie jar shared by every clone of this session.
    #[must_use]
    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }
}
