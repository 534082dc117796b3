//! Mock Garmin SSO and main-service responses for wiremock-based tests.

use garmin_core::{AuthContext, AuthFlow, Credentials, Endpoint, GarminConnect, Session};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CSRF_TOKEN: &str = "Csrf0123456789";
pub const TICKET: &str = "ST-0481516-AbCdEf-cas";
pub const DISPLAY_NAME: &str = "runner42";

pub const SIGNIN_PAGE: &str = r#"<html><body><form method="post">
<input type="hidden" name="_csrf" value="Csrf0123456789" />
<input name="username" /><input name="password" type="password" />
</form></body></html>"#;

pub const TICKET_PAGE: &str = r#"<html><script>
var response_url = "https:\/\/connect.garmin.com\/modern?ticket=ST-0481516-AbCdEf-cas";
</script></html>"#;

pub const LANDING_PAGE: &str = r#"<html><head><script>
VIEWER_USERPREFERENCES = {\"displayName\":\"runner42\",\"measurementSystem\":\"metric\"};
VIEWER_SOCIAL_PROFILE = {"fullName":"Pat Runner","userName":"pat"};
</script></head></html>"#;

/// Client set pointing both hosts at the mock server.
pub fn connect_for(server: &MockServer) -> GarminConnect {
    GarminConnect::with_endpoints(
        Session::new().expect("session"),
        Endpoint::from_base_url(&server.uri(), "sso").expect("sso endpoint"),
        Endpoint::from_base_url(&server.uri(), "modern").expect("modern endpoint"),
    )
}

pub fn credentials() -> Credentials {
    Credentials::new("pat@example.com", "hunter2")
}

pub async fn mount_signin_page(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/sso/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_credential_post(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/sso/signin"))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_landing_page(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/modern/"))
        .and(query_param("ticket", TICKET))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts the three login steps with well-formed responses.
pub async fn mount_successful_login(server: &MockServer) {
    mount_signin_page(server, SIGNIN_PAGE).await;
    mount_credential_post(server, ResponseTemplate::new(200).set_body_string(TICKET_PAGE)).await;
    mount_landing_page(server, LANDING_PAGE).await;
}

/// Logs in against the mocked login and returns an authenticated client set.
pub async fn authenticate(server: &MockServer) -> (GarminConnect, AuthContext) {
    mount_successful_login(server).await;
    let connect = connect_for(server);
    let auth = AuthFlow::new(&connect, credentials())
        .login()
        .await
        .expect("mock login should succeed");
    (connect, auth)
}
