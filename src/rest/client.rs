//! REST client bound to one endpoint of the shared session.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;
use url::form_urlencoded;

use super::{Endpoint, RequestError, Session};

/// Empty query-parameter list for calls that take none.
pub const NO_PARAMS: &[(&str, &str)] = &[];

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Issues requests against a single [`Endpoint`] through a shared [`Session`].
///
/// ```no_run
/// use garmin_core::rest::{Endpoint, NO_PARAMS, RestClient, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let modern = RestClient::new(Session::new()?, Endpoint::https("connect.garmin.com", "modern"));
/// let activities = modern.derive("proxy/activity-service/activity");
/// let types = activities.get_json("activityTypes", NO_PARAMS).await?;
/// println!("{types}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    session: Session,
    endpoint: Endpoint,
}

impl RestClient {
    #[must_use]
    pub fn new(session: Session, endpoint: Endpoint) -> Self {
        Self { session, endpoint }
    }

    /// Returns a client for a sub-resource that shares this client's session.
    #[must_use]
    pub fn derive(&self, route: &str) -> Self {
        Self {
            session: self.session.clone(),
            endpoint: self.endpoint.derive(route),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// See [`Endpoint::compose_url`].
    #[must_use]
    pub fn compose_url(&self, leaf_route: Option<&str>) -> String {
        self.endpoint.compose_url(leaf_route)
    }

    /// Builds the full request URL for `leaf_route` with `params` appended as a query string.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] if the composed URL does not parse.
    pub fn request_url<K, V>(&self, leaf_route: &str, params: &[(K, V)]) -> Result<Url, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let raw = self.compose_url(Some(leaf_route));
        let mut url = Url::parse(&raw).map_err(|_| RequestError::invalid_url(raw.clone()))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }

    /// Endpoint default headers overlaid with per-call headers (per-call values win).
    #[must_use]
    pub fn merged_headers(&self, extra: Option<&HeaderMap>) -> HeaderMap {
        let mut headers = self.endpoint.headers().clone();
        if let Some(extra) = extra {
            for (name, value) in extra {
                headers.insert(name.clone(), value.clone());
            }
        }
        headers
    }

    /// Issues a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure or a non-2xx status.
    #[instrument(level = "debug", skip(self, headers, params), fields(base = %self.endpoint.base_route()))]
    pub async fn get<K, V>(
        &self,
        leaf_route: &str,
        headers: Option<&HeaderMap>,
        params: &[(K, V)],
    ) -> Result<Response, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.request_url(leaf_route, params)?;
        let request = self
            .session
            .client()
            .get(url.clone())
            .headers(self.merged_headers(headers));
        send(request, &url).await
    }

    /// Issues a GET request and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure, a non-2xx status, or a
    /// body that is not JSON.
    pub async fn get_json<K, V>(&self, leaf_route: &str, params: &[(K, V)]) -> Result<Value, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let response = self.get(leaf_route, None, params).await?;
        let url = redacted_url(response.url());
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::network(url.clone(), e))?;
        serde_json::from_str(&body).map_err(|e| RequestError::invalid_json(url, e))
    }

    /// Issues a GET request and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure or a non-2xx status.
    pub async fn get_bytes<K, V>(&self, leaf_route: &str, params: &[(K, V)]) -> Result<Vec<u8>, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let response = self.get(leaf_route, None, params).await?;
        let url = redacted_url(response.url());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::network(url, e))?;
        Ok(bytes.to_vec())
    }

    /// Issues a POST with `data` encoded as `application/x-www-form-urlencoded`.
    ///
    /// A `Content-Type` passed in `headers` is kept; otherwise the form type is set.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure or a non-2xx status.
    #[instrument(level = "debug", skip(self, headers, params, data), fields(base = %self.endpoint.base_route()))]
    pub async fn post_form<K, V, DK, DV>(
        &self,
        leaf_route: &str,
        headers: &HeaderMap,
        params: &[(K, V)],
        data: &[(DK, DV)],
    ) -> Result<Response, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        DK: AsRef<str>,
        DV: AsRef<str>,
    {
        let url = self.request_url(leaf_route, params)?;
        let mut merged = self.merged_headers(Some(headers));
        merged
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(FORM_CONTENT_TYPE));
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(data.iter())
            .finish();
        let request = self
            .session
            .client()
            .post(url.clone())
            .headers(merged)
            .body(body);
        send(request, &url).await
    }
}

/// `url` without its query string or fragment, for logs and error messages.
///
/// Query parameters can carry the SSO service ticket.
pub(crate) fn redacted_url(url: &Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    redacted.set_fragment(None);
    redacted.into()
}

async fn send(request: RequestBuilder, url: &Url) -> Result<Response, RequestError> {
    let loggable = redacted_url(url);
    trace!(url = %loggable, "sending request");
    let response = request
        .send()
        .await
        .map_err(|e| RequestError::network(loggable.clone(), e))?;
    let status = response.status();
    if !status.is_success() {
        debug!(url = %loggable, status = status.as_u16(), "request failed with HTTP status");
        return Err(RequestError::http_status(loggable, status.as_u16()));
    }
    Ok(response)
}
