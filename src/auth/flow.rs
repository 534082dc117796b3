//! Two-step SSO handshake against the Garmin login widget.
//!
//! The flow is strictly linear:
//!
//! 1. GET the sign-in page and pull the `_csrf` token out of the form.
//! 2. POST the credentials with that token; pull the `?ticket=` out of the reply.
//! 3. GET the main-service landing page with the ticket and scrape the
//!    viewer's preferences and social profile from embedded JSON.
//!
//! Any failure aborts the login. Nothing is retried.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, REFERER};
use tracing::{debug, info, instrument, warn};

use super::{AuthContext, AuthError, Credentials};
use crate::connect::GarminConnect;
use crate::rest::{RequestError, redacted_url};
use crate::schema::require_str;
use crate::scrape::{CSRF_TOKEN_RE, TICKET_RE, capture_first, extract_embedded_json};

const SIGNIN_ROUTE: &str = "signin";

const CONNECT_BASE_URL: &str = "https://connect.garmin.com";
const CONNECT_SIGNIN_URL: &str = "https://connect.garmin.com/en-US/signin";
const GAUTH_CSS_URL: &str =
    "https://static.garmincdn.com/com.garmin.connect/ui/css/gauth-custom-v1.2-min.css";
const PRIVACY_STATEMENT_URL: &str = "//connect.garmin.com/en-US/privacy/";

const USER_PREFERENCES_VAR: &str = "VIEWER_USERPREFERENCES";
const SOCIAL_PROFILE_VAR: &str = "VIEWER_SOCIAL_PROFILE";

/// Widget flags the login page needs to render the embedded form.
const WIDGET_FLAGS: &[(&str, &str)] = &[
    ("locale", "en_US"),
    ("id", "gauth-widget"),
    ("cssUrl", GAUTH_CSS_URL),
    ("privacyStatementUrl", PRIVACY_STATEMENT_URL),
    ("clientId", "GarminConnect"),
    ("rememberMeShown", "true"),
    ("rememberMeChecked", "false"),
    ("createAccountShown", "true"),
    ("openCreateAccount", "false"),
    ("displayNameShown", "false"),
    ("consumeServiceTicket", "false"),
    ("initialFocus", "true"),
    ("embedWidget", "false"),
    ("generateExtraServiceTicket", "true"),
    ("generateTwoExtraServiceTickets", "false"),
    ("generateNoServiceTicket", "false"),
    ("globalOptInShown", "true"),
    ("globalOptInChecked", "false"),
    ("mobile", "false"),
    ("connectLegalTerms", "true"),
    ("locationPromptShown", "true"),
    ("showPassword", "true"),
];

/// Runs the SSO login for one set of credentials.
///
/// ```no_run
/// use garmin_core::auth::{AuthFlow, Credentials};
/// use garmin_core::connect::GarminConnect;
/// use garmin_core::rest::Session;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connect = GarminConnect::new(Session::new()?);
/// let auth = AuthFlow::new(&connect, Credentials::new("me@example.com", "secret"))
///     .login()
///     .await?;
/// println!("logged in as {}", auth.display_name());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuthFlow<'c> {
    connect: &'c GarminConnect,
    credentials: Credentials,
}

impl<'c> AuthFlow<'c> {
    #[must_use]
    pub fn new(connect: &'c GarminConnect, credentials: Credentials) -> Self {
        Self {
            connect,
            credentials,
        }
    }

    /// Query parameters shared by the sign-in GET and POST.
    #[must_use]
    pub fn signin_params(&self) -> Vec<(&'static str, String)> {
        let service = self.connect.modern().compose_url(None);
        let gauth_host = self.connect.sso().compose_url(None);
        let mut params = vec![
            ("service", service.clone()),
            ("webhost", CONNECT_BASE_URL.to_string()),
            ("source", CONNECT_SIGNIN_URL.to_string()),
            ("redirectAfterAccountLoginUrl", service.clone()),
            ("redirectAfterAccountCreationUrl", service),
            ("gauthHost", gauth_host),
        ];
        params.extend(
            WIDGET_FLAGS
                .iter()
                .map(|(key, value)| (*key, (*value).to_string())),
        );
        params
    }

    /// Performs the full login.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredentials`] before any request if a credential is empty
    /// - [`AuthError::CsrfTokenNotFound`] / [`AuthError::TicketNotFound`] when a
    ///   page lacks the expected marker
    /// - [`AuthError::RateLimited`] when the credential POST returns 429
    /// - [`AuthError::Parse`] / [`AuthError::Schema`] when the landing page
    ///   profile blobs are missing or incomplete
    /// - [`AuthError::Request`] for any other transport or HTTP failure
    #[instrument(skip(self))]
    pub async fn login(self) -> Result<AuthContext, AuthError> {
        if self.credentials.is_incomplete() {
            warn!("login skipped: missing username or password");
            return Err(AuthError::MissingCredentials);
        }

        let params = self.signin_params();
        let (csrf_token, login_page_url) = self.fetch_csrf_token(&params).await?;
        let ticket = self
            .submit_credentials(&params, &csrf_token, &login_page_url)
            .await?;
        let context = self.exchange_ticket(&ticket).await?;

        info!(display_name = %context.display_name(), "logged in to Garmin Connect");
        Ok(context)
    }

    async fn fetch_csrf_token(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<(String, String), AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(CONNECT_SIGNIN_URL));

        let response = self
            .connect
            .sso()
            .get(SIGNIN_ROUTE, Some(&headers), params)
            .await?;
        let page_url = response.url().to_string();
        let loggable = redacted_url(response.url());
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::network(loggable.clone(), e))?;

        let token = capture_first(&CSRF_TOKEN_RE, &body)
            .ok_or_else(|| AuthError::csrf_token_not_found(loggable))?;
        debug!("login page loaded, CSRF token found");
        Ok((token.to_string(), page_url))
    }

    async fn submit_credentials(
        &self,
        params: &[(&'static str, String)],
        csrf_token: &str,
        login_page_url: &str,
    ) -> Result<String, AuthError> {
        let mut headers = HeaderMap::new();
        if let Ok(referer) = HeaderValue::from_str(login_page_url) {
            headers.insert(REFERER, referer);
        }
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let data = [
            ("username", self.credentials.username()),
            ("password", self.credentials.password()),
            ("embed", "false"),
            ("_csrf", csrf_token),
        ];

        let sso = self.connect.sso();
        let response = match sso.post_form(SIGNIN_ROUTE, &headers, params, &data).await {
            Ok(response) => response,
            Err(RequestError::HttpStatus { url, status: 429 }) => {
                warn!(url = %url, "credential submission rate limited");
                return Err(AuthError::rate_limited(url));
            }
            Err(error) => return Err(error.into()),
        };
        let post_url = redacted_url(response.url());
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::network(post_url.clone(), e))?;

        let ticket = capture_first(&TICKET_RE, &body)
            .ok_or_else(|| AuthError::ticket_not_found(post_url))?;
        debug!("credentials accepted, SSO ticket issued");
        Ok(ticket.to_string())
    }

    async fn exchange_ticket(&self, ticket: &str) -> Result<AuthContext, AuthError> {
        let modern = self.connect.modern();
        let response = modern.get("", None, &[("ticket", ticket)]).await?;
        let landing_url = redacted_url(response.url());
        let html = response
            .text()
            .await
            .map_err(|e| RequestError::network(landing_url, e))?;

        let user_preferences = extract_embedded_json(&html, USER_PREFERENCES_VAR)?;
        let display_name = require_str(&user_preferences, "displayName", USER_PREFERENCES_VAR)?
            .to_string();
        let social_profile = extract_embedded_json(&html, SOCIAL_PROFILE_VAR)?;
        let full_name =
            require_str(&social_profile, "fullName", SOCIAL_PROFILE_VAR)?.to_string();

        Ok(AuthContext::new(
            display_name,
            full_name,
            user_preferences,
            social_profile,
        ))
    }
}
