//! Wiring of the Garmin Connect hosts onto one shared session.

use reqwest::header::{HeaderName, HeaderValue};

use crate::rest::{Endpoint, RestClient, Session};

/// Host serving the single-sign-on login widget.
pub const SSO_HOST: &str = "sso.garmin.com";
/// Base route of the SSO host.
pub const SSO_BASE_ROUTE: &str = "sso";
/// Host serving the main web application and its proxied services.
pub const MODERN_HOST: &str = "connect.garmin.com";
/// Base route every data endpoint hangs off.
pub const MODERN_BASE_ROUTE: &str = "modern";

const ACTIVITY_SERVICE_ROUTE: &str = "proxy/activity-service/activity";
const DOWNLOAD_SERVICE_ROUTE: &str = "proxy/download-service/files";

/// Marker header the web UI sends with every request.
const NK_HEADER: &str = "nk";
const NK_VALUE: &str = "NT";

/// The set of REST clients used to talk to Garmin Connect.
///
/// All clients share the same [`Session`], so cookies obtained by the SSO
/// login are presented to the main service without re-authenticating.
#[derive(Debug, Clone)]
pub struct GarminConnect {
    sso: RestClient,
    modern: RestClient,
    activity_service: RestClient,
    download_service: RestClient,
}

impl GarminConnect {
    /// Creates clients for the production Garmin hosts.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self::with_endpoints(
            session,
            Endpoint::https(SSO_HOST, SSO_BASE_ROUTE),
            Endpoint::https(MODERN_HOST, MODERN_BASE_ROUTE),
        )
    }

    /// Creates clients for custom SSO and main-service endpoints (used by integration tests).
    ///
    /// The `NK: NT` marker header is added to both endpoints and inherited by
    /// the derived service clients.
    #[must_use]
    pub fn with_endpoints(session: Session, sso: Endpoint, modern: Endpoint) -> Self {
        let sso = RestClient::new(session.clone(), with_nk_header(sso));
        let modern = RestClient::new(session, with_nk_header(modern));
        let activity_service = modern.derive(ACTIVITY_SERVICE_ROUTE);
        let download_service = modern.derive(DOWNLOAD_SERVICE_ROUTE);
        Self {
            sso,
            modern,
            activity_service,
            download_service,
        }
    }

    /// Client for the SSO login host.
    #[must_use]
    pub fn sso(&self) -> &RestClient {
        &self.sso
    }

    /// Client for the main service (`.../modern`).
    #[must_use]
    pub fn modern(&self) -> &RestClient {
        &self.modern
    }

    /// Client for activity details and activity types.
    #[must_use]
    pub fn activity_service(&self) -> &RestClient {
        &self.activity_service
    }

    /// Client for binary file downloads (monitoring archives).
    #[must_use]
    pub fn download_service(&self) -> &RestClient {
        &self.download_service
    }
}

fn with_nk_header(endpoint: Endpoint) -> Endpoint {
    endpoint.with_header(
        HeaderName::from_static(NK_HEADER),
        HeaderValue::from_static(NK_VALUE),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_production_urls() {
        let connect = GarminConnect::new(Session::new().unwrap());
        assert_eq!(connect.sso().compose_url(None), "https://sso.garmin.com/sso");
        assert_eq!(
            connect.modern().compose_url(None),
            "https://connect.garmin.com/modern"
        );
        assert_eq!(
            connect.activity_service().compose_url(Some("123")),
            "https://connect.garmin.com/modern/proxy/activity-service/activity/123"
        );
        assert_eq!(
            connect.download_service().compose_url(Some("wellness/2024-03-05")),
            "https://connect.garmin.com/modern/proxy/download-service/files/wellness/2024-03-05"
        );
    }

    #[test]
    fn test_every_client_carries_nk_header() {
        let connect = GarminConnect::new(Session::new().unwrap());
        for client in [
            connect.sso(),
            connect.modern(),
            connect.activity_service(),
            connect.download_service(),
        ] {
            assert_eq!(client.endpoint().headers().get("NK").unwrap(), "NT");
        }
    }
}
