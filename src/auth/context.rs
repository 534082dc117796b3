//! Login inputs and the authenticated user context.

use std::fmt;

use serde_json::Value;

/// Garmin Connect account credentials.
///
/// `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// True when either field is empty.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.username.is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The viewer's identity, scraped from the landing page after login.
///
/// Only a successful [`AuthFlow::login`](super::AuthFlow::login) produces one,
/// and the fetch loop cannot be built without it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    display_name: String,
    full_name: String,
    user_preferences: Value,
    social_profile: Value,
}

impl AuthContext {
    pub(crate) fn new(
        display_name: String,
        full_name: String,
        user_preferences: Value,
        social_profile: Value,
    ) -> Self {
        Self {
            display_name,
            full_name,
            user_preferences,
            social_profile,
        }
    }

    /// Display name; several endpoints embed it in their path.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The full `VIEWER_USERPREFERENCES` blob.
    #[must_use]
    pub fn user_preferences(&self) -> &Value {
        &self.user_preferences
    }

    /// The full `VIEWER_SOCIAL_PROFILE` blob.
    #[must_use]
    pub fn social_profile(&self) -> &Value {
        &self.social_profile
    }
}
