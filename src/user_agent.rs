//! User-Agent strings sent to Garmin Connect.
//!
//! The login pages sit behind bot detection that rejects obvious tool
//! identifiers, so the session presents itself as a desktop browser.

/// Desktop Firefox on macOS, the agent the login widget is known to accept.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.14; rv:66.0) Gecko/20100101 Firefox/66.0";

/// Default User-Agent for every session request.
#[must_use]
pub(crate) fn default_session_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}
