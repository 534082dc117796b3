//! Integration tests for the paced fetch loop against a mocked Garmin.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, Request, ResponseTemplate};

use garmin_core::{
    ActivitySearch, DailyStat, Endpoint, FetchError, FetchUnit, Fetcher, GarminConnect,
    RequestError, Session,
};

mod support;
use support::garmin_mock::authenticate;
use support::socket_guard::start_mock_server_or_skip;

const SLEEP_PATH: &str = "/modern/proxy/wellness-service/wellness/dailySleepData/runner42";
const SEARCH_PATH: &str = "/modern/proxy/activitylist-service/activities/search/activities";
const DETAIL_PATH_RE: &str = r"^/modern/proxy/activity-service/activity/\d+$";

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn query_value(request: &Request, key: &str) -> String {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Echoes the requested `date` query parameter back as JSON.
fn echo_date(request: &Request) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"calendarDate": query_value(request, "date")}))
}

/// Echoes the activity id from the last path segment.
fn echo_activity(request: &Request) -> ResponseTemplate {
    let id = request.url.path().rsplit('/').next().unwrap_or_default().to_string();
    ResponseTemplate::new(200).set_body_json(json!({"activityId": id}))
}

/// Main-service client pointed at a port nothing listens on.
fn connect_to_closed_port() -> GarminConnect {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    GarminConnect::with_endpoints(
        Session::new().unwrap(),
        Endpoint::from_base_url(&base, "sso").unwrap(),
        Endpoint::from_base_url(&base, "modern").unwrap(),
    )
}

async fn paths_under(server: &wiremock::MockServer, prefix: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .map(|r| r.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_fetch_daily_issues_one_request_per_day_in_date_order() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SLEEP_PATH))
        .and(query_param("nonSleepBufferMinutes", "60"))
        .and(header("nk", "NT"))
        .respond_with(echo_date)
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let documents = fetcher
        .fetch_daily(DailyStat::Sleep, date(2, 28), 3)
        .await
        .unwrap();

    let days: Vec<&str> = documents
        .iter()
        .map(|doc| doc["calendarDate"].as_str().unwrap())
        .collect();
    assert_eq!(days, ["2024-02-28", "2024-02-29", "2024-03-01"]);
}

#[tokio::test]
async fn test_fetch_range_uses_builder_for_each_date() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/modern/custom/\d{4}-\d{2}-\d{2}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(5)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let documents = fetcher
        .fetch_range(date(3, 1), 5, |day| FetchUnit::path_only(format!("custom/{day}")))
        .await
        .unwrap();

    assert_eq!(documents.len(), 5);
    assert_eq!(
        paths_under(&server, "/modern/custom/").await,
        [
            "/modern/custom/2024-03-01",
            "/modern/custom/2024-03-02",
            "/modern/custom/2024-03-03",
            "/modern/custom/2024-03-04",
            "/modern/custom/2024-03-05",
        ]
    );
}

#[tokio::test]
async fn test_fetch_range_zero_days_makes_no_requests() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SLEEP_PATH))
        .respond_with(echo_date)
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let documents = fetcher.fetch_daily(DailyStat::Sleep, date(3, 5), 0).await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_requests_are_paced() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SLEEP_PATH))
        .respond_with(echo_date)
        .mount(&server)
        .await;

    let pacing = Duration::from_millis(40);
    let fetcher = Fetcher::new(connect, auth).with_pacing(pacing);
    let started = Instant::now();
    fetcher.fetch_daily(DailyStat::Sleep, date(3, 5), 3).await.unwrap();
    assert!(started.elapsed() >= pacing * 3, "elapsed {:?}", started.elapsed());
}

#[tokio::test]
async fn test_failure_mid_range_aborts_remaining_days() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SLEEP_PATH))
        .respond_with(|request: &Request| {
            if query_value(request, "date") == "2024-03-07" {
                ResponseTemplate::new(500)
            } else {
                echo_date(request)
            }
        })
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let err = fetcher
        .fetch_daily(DailyStat::Sleep, date(3, 5), 5)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request(_)), "got {err:?}");
    assert_eq!(err.status(), Some(500));
    assert_eq!(paths_under(&server, SLEEP_PATH).await.len(), 3);
}

#[tokio::test]
async fn test_non_json_body_is_request_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SLEEP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let err = fetcher
        .fetch_daily(DailyStat::Sleep, date(3, 5), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Request(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_empty_activity_search_makes_no_detail_requests() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(DETAIL_PATH_RE))
        .respond_with(echo_activity)
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let activities = fetcher
        .fetch_activities(&ActivitySearch::new(date(3, 1), date(3, 7)))
        .await
        .unwrap();
    assert!(activities.is_empty());
}

#[tokio::test]
async fn test_null_activity_search_is_empty() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let activities = fetcher
        .fetch_activities(&ActivitySearch::new(date(3, 1), date(3, 7)))
        .await
        .unwrap();
    assert!(activities.is_empty());
}

#[tokio::test]
async fn test_activity_details_keyed_by_id_in_search_order() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("startDate", "2024-03-01"))
        .and(query_param("endDate", "2024-03-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"activityId": 300, "activityName": "Evening Run"},
            {"activityId": 100, "activityName": "Morning Ride"},
            {"activityId": 200, "activityName": "Lunch Swim"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(DETAIL_PATH_RE))
        .respond_with(echo_activity)
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let activities = fetcher
        .fetch_activities(&ActivitySearch::new(date(3, 1), date(3, 7)))
        .await
        .unwrap();

    let ids: Vec<&String> = activities.keys().collect();
    assert_eq!(ids, ["300", "100", "200"]);
    assert_eq!(activities["100"]["activityId"], "100");
}

#[tokio::test]
async fn test_activity_search_limit_is_sent() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", "0"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let search = ActivitySearch::new(date(3, 1), date(3, 7)).with_limit(2);
    fetcher.fetch_activities(&search).await.unwrap();
}

#[tokio::test]
async fn test_search_result_without_activity_id_is_schema_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"activityName": "Mystery"}])),
        )
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let err = fetcher
        .fetch_activities(&ActivitySearch::new(date(3, 1), date(3, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Schema(_)), "got {err:?}");
}

#[tokio::test]
async fn test_activity_types_and_monitoring_archives() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (connect, auth) = authenticate(&server).await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/activity-service/activity/activityTypes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"typeKey": "running"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/modern/proxy/download-service/files/wellness/2024-03-0[56]$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04zip".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(connect, auth).with_pacing(Duration::ZERO);
    let types = fetcher.fetch_activity_types().await.unwrap();
    assert_eq!(types[0]["typeKey"], "running");

    let archives = fetcher.fetch_monitoring(date(3, 5), 2).await.unwrap();
    assert_eq!(archives.len(), 2);
    assert_eq!(archives[0].0, date(3, 5));
    assert_eq!(archives[1].0, date(3, 6));
    assert_eq!(archives[1].1, b"PK\x03\x04zip");
}

#[tokio::test]
async fn test_connection_refused_mid_session_is_network_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (_, auth) = authenticate(&server).await;
    let fetcher = Fetcher::new(connect_to_closed_port(), auth).with_pacing(Duration::ZERO);

    let err = fetcher
        .fetch_daily(DailyStat::Sleep, date(3, 1), 3)
        .await
        .unwrap_err();
    assert!(
        matches!(err, FetchError::Request(RequestError::Network { .. })),
        "got {err:?}"
    );
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains("dailySleepData"), "{err}");
    assert!(!err.to_string().contains("nonSleepBufferMinutes"), "{err}");
}

#[tokio::test]
async fn test_connection_refused_during_activity_search_is_network_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let (_, auth) = authenticate(&server).await;
    let fetcher = Fetcher::new(connect_to_closed_port(), auth).with_pacing(Duration::ZERO);

    let err = fetcher
        .fetch_activities(&ActivitySearch::new(date(3, 1), date(3, 7)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, FetchError::Request(RequestError::Network { .. })),
        "got {err:?}"
    );
    assert_eq!(err.status(), None);
}
