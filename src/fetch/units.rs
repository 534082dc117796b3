//! Fetch units: the `(path, query)` pair for one day or one item.
//!
//! Every builder here is a pure function of its inputs. Paths are relative to
//! the main-service base route (`.../modern`).

use std::fmt;

use chrono::{Local, NaiveDate, NaiveTime};

use crate::auth::AuthContext;

const DAILY_SUMMARY_ROUTE: &str = "proxy/usersummary-service/usersummary/daily";
const DAILY_HYDRATION_ROUTE: &str = "proxy/usersummary-service/usersummary/hydration/allData";
const SLEEP_DAILY_ROUTE: &str = "proxy/wellness-service/wellness/dailySleepData";
const WEIGHT_RANGE_ROUTE: &str = "proxy/weight-service/weight/dateRange";
const RESTING_HEART_RATE_ROUTE: &str = "proxy/userstats-service/wellness/daily";
const ACTIVITY_SEARCH_ROUTE: &str = "proxy/activitylist-service/activities/search/activities";

/// Relative to the download service (`.../proxy/download-service/files`).
const MONITORING_ROUTE: &str = "wellness";

/// Sleep data includes this many minutes of wake time around the sleep window.
const NON_SLEEP_BUFFER_MINUTES: &str = "60";
/// Metric id of resting heart rate in the user-stats service.
const RESTING_HEART_RATE_METRIC_ID: &str = "60";

/// Cache-busting query key used by some web UI requests.
const CACHE_BUSTER_KEY: &str = "_";

/// A single request: leaf route plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchUnit {
    path: String,
    params: Vec<(String, String)>,
}

impl FetchUnit {
    #[must_use]
    pub fn new(path: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    /// A unit with no query parameters.
    #[must_use]
    pub fn path_only(path: impl Into<String>) -> Self {
        Self::new(path, Vec::new())
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns the value of the first parameter named `key`.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Appends `_=<epoch ms of local midnight of date>`.
    ///
    /// Off for every built-in endpoint; the web UI only sends it on some requests.
    #[must_use]
    pub fn with_cache_buster(mut self, date: NaiveDate) -> Self {
        self.params
            .push((CACHE_BUSTER_KEY.to_string(), local_midnight_epoch_ms(date).to_string()));
        self
    }
}

fn local_midnight_epoch_ms(date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(|| midnight.and_utc().timestamp_millis(), |dt| dt.timestamp_millis())
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// Per-day statistics fetched one request per calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DailyStat {
    /// Daily summary (steps, calories, stress...).
    Summary,
    /// Hydration log.
    Hydration,
    /// Sleep record.
    Sleep,
    /// Weigh-ins for the day.
    Weight,
    /// Resting heart rate.
    RestingHeartRate,
}

impl DailyStat {
    /// Every daily statistic, in download order.
    pub const ALL: [Self; 5] = [
        Self::Summary,
        Self::Hydration,
        Self::Sleep,
        Self::Weight,
        Self::RestingHeartRate,
    ];

    /// Stable short name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Hydration => "hydration",
            Self::Sleep => "sleep",
            Self::Weight => "weight",
            Self::RestingHeartRate => "rhr",
        }
    }

    /// File name prefix for per-day JSON files (`<prefix>_<date>.json`).
    #[must_use]
    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Summary => "daily_summary",
            Self::Hydration => "hydration",
            Self::Sleep => "sleep",
            Self::Weight => "weight",
            Self::RestingHeartRate => "rhr",
        }
    }

    /// Builds the request for `date`.
    #[must_use]
    pub fn fetch_unit(self, auth: &AuthContext, date: NaiveDate) -> FetchUnit {
        let day = iso(date);
        let display_name = auth.display_name();
        match self {
            Self::Summary => FetchUnit::new(
                format!("{DAILY_SUMMARY_ROUTE}/{display_name}"),
                vec![param("calendarDate", day)],
            ),
            Self::Hydration => FetchUnit::path_only(format!("{DAILY_HYDRATION_ROUTE}/{day}")),
            Self::Sleep => FetchUnit::new(
                format!("{SLEEP_DAILY_ROUTE}/{display_name}"),
                vec![
                    param("date", day),
                    param("nonSleepBufferMinutes", NON_SLEEP_BUFFER_MINUTES),
                ],
            ),
            Self::Weight => FetchUnit::new(
                WEIGHT_RANGE_ROUTE,
                vec![param("startDate", day.clone()), param("endDate", day)],
            ),
            Self::RestingHeartRate => FetchUnit::new(
                format!("{RESTING_HEART_RATE_ROUTE}/{display_name}"),
                vec![
                    param("fromDate", day.clone()),
                    param("untilDate", day),
                    param("metricId", RESTING_HEART_RATE_METRIC_ID),
                ],
            ),
        }
    }
}

impl fmt::Display for DailyStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity search over an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySearch {
    start_date: NaiveDate,
    end_date: NaiveDate,
    limit: Option<u32>,
}

impl ActivitySearch {
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            limit: None,
        }
    }

    /// Caps the number of results (`start=0&limit=N`).
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn fetch_unit(&self) -> FetchUnit {
        let mut params = Vec::with_capacity(4);
        if let Some(limit) = self.limit {
            params.push(param("start", "0"));
            params.push(param("limit", limit.to_string()));
        }
        params.push(param("startDate", iso(self.start_date)));
        params.push(param("endDate", iso(self.end_date)));
        FetchUnit::new(ACTIVITY_SEARCH_ROUTE, params)
    }
}

/// Daily monitoring archive, relative to the download service.
#[must_use]
pub fn monitoring_unit(date: NaiveDate) -> FetchUnit {
    FetchUnit::path_only(format!("{MONITORING_ROUTE}/{}", iso(date)))
}
