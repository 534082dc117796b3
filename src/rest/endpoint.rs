//! Endpoint descriptors: where a REST client points and which headers it sends.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::RequestError;

/// URL scheme used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain HTTP (default port 80).
    Http,
    /// HTTP over TLS (default port 443).
    Https,
}

impl Protocol {
    /// The port a URL may omit for this scheme.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    /// Scheme text as it appears in a URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a REST endpoint.
///
/// A child endpoint is produced with [`derive`](Self::derive), which copies
/// host, protocol, port and headers and extends the base route. The copy owns
/// its own header map, so nothing a child does can leak into its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    protocol: Protocol,
    host: String,
    port: u16,
    base_route: String,
    headers: HeaderMap,
}

impl Endpoint {
    /// Creates an endpoint with no default headers.
    #[must_use]
    pub fn new(
        protocol: Protocol,
        host: impl Into<String>,
        port: u16,
        base_route: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
            base_route: base_route.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Creates an HTTPS endpoint on the default port.
    #[must_use]
    pub fn https(host: impl Into<String>, base_route: impl Into<String>) -> Self {
        Self::new(
            Protocol::Https,
            host,
            Protocol::Https.default_port(),
            base_route,
        )
    }

    /// Creates an endpoint from a base URL such as `http://127.0.0.1:8080`.
    ///
    /// Only scheme, host and port are taken from `base_url`; its path is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidUrl`] when the URL does not parse, has no
    /// host, or uses a scheme other than `http`/`https`.
    pub fn from_base_url(
        base_url: &str,
        base_route: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let parsed = Url::parse(base_url).map_err(|_| RequestError::invalid_url(base_url))?;
        let protocol = match parsed.scheme() {
            "http" => Protocol::Http,
            "https" => Protocol::Https,
            _ => return Err(RequestError::invalid_url(base_url)),
        };
        let host = parsed
            .host_str()
            .ok_or_else(|| RequestError::invalid_url(base_url))?;
        let port = parsed.port().unwrap_or(protocol.default_port());
        Ok(Self::new(protocol, host, port, base_route))
    }

    /// Returns a copy with one more default header. Later values replace earlier ones.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Builds `protocol://host[:port]/base_route[/leaf_route]`.
    ///
    /// The port is omitted when it is the scheme default.
    #[must_use]
    pub fn compose_url(&self, leaf_route: Option<&str>) -> String {
        let path = match leaf_route {
            Some(leaf) => format!("{}/{leaf}", self.base_route),
            None => self.base_route.clone(),
        };
        if self.port == self.protocol.default_port() {
            format!("{}://{}/{path}", self.protocol, self.host)
        } else {
            format!("{}://{}:{}/{path}", self.protocol, self.host, self.port)
        }
    }

    /// Returns a child endpoint whose base route is `{base_route}/{route}`.
    #[must_use]
    pub fn derive(&self, route: &str) -> Self {
        Self {
            protocol: self.protocol,
            host: self.host.clone(),
            port: self.port,
            base_route: format!("{}/{route}", self.base_route),
            headers: self.headers.clone(),
        }
    }

    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn base_route(&self) -> &str {
        &self.base_route
    }

    /// Default headers sent with every request to this endpoint.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
