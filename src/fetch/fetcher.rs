//! The paced, strictly sequential fetch loop.

use std::time::Duration;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::units::{ActivitySearch, DailyStat, FetchUnit, monitoring_unit};
use super::FetchError;
use crate::auth::AuthContext;
use crate::connect::GarminConnect;
use crate::rest::NO_PARAMS;
use crate::schema::{SchemaError, require_id};

/// Pause after every request, to stay under Garmin's rate limiting.
pub const PAGE_DELAY: Duration = Duration::from_secs(1);

const ACTIVITY_TYPES_ROUTE: &str = "activityTypes";

/// Downloads per-day statistics and activities for an authenticated user.
///
/// Requests are issued one at a time, each followed by a fixed pause. A
/// failing request aborts the whole call; nothing is retried and partial
/// results are not returned.
#[derive(Debug, Clone)]
pub struct Fetcher {
    connect: GarminConnect,
    auth: AuthContext,
    pacing: Duration,
    show_progress: bool,
}

impl Fetcher {
    /// Creates a fetcher. An [`AuthContext`] only exists after a successful
    /// login, so no fetch can run before one.
    #[must_use]
    pub fn new(connect: GarminConnect, auth: AuthContext) -> Self {
        Self {
            connect,
            auth,
            pacing: PAGE_DELAY,
            show_progress: false,
        }
    }

    /// Overrides the inter-request pause (used by integration tests).
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Shows a progress bar per loop on the terminal.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Fetches one JSON document per day for `day_count` days from `start`.
    ///
    /// `build` maps each date to its request. Results are in date order.
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`]; earlier results are discarded.
    #[instrument(skip(self, build))]
    pub async fn fetch_range<F>(
        &self,
        start: NaiveDate,
        day_count: u32,
        mut build: F,
    ) -> Result<Vec<Value>, FetchError>
    where
        F: FnMut(NaiveDate) -> FetchUnit,
    {
        let progress = self.progress_bar(u64::from(day_count), "days");
        let mut documents = Vec::with_capacity(day_count as usize);

        for date in start.iter_days().take(day_count as usize) {
            let unit = build(date);
            debug!(%date, path = unit.path(), "fetching day");
            let document = self
                .connect
                .modern()
                .get_json(unit.path(), unit.params())
                .await?;
            documents.push(document);
            progress.inc(1);
            self.pause().await;
        }

        progress.finish_and_clear();
        Ok(documents)
    }

    /// Fetches one [`DailyStat`] for each day of the range.
    ///
    /// # Errors
    ///
    /// See [`fetch_range`](Self::fetch_range).
    pub async fn fetch_daily(
        &self,
        stat: DailyStat,
        start: NaiveDate,
        day_count: u32,
    ) -> Result<Vec<Value>, FetchError> {
        info!(%stat, %start, days = day_count, "downloading daily statistic");
        self.fetch_range(start, day_count, |date| stat.fetch_unit(&self.auth, date))
            .await
    }

    /// Searches activities and fetches the detail of each result.
    ///
    /// The map is keyed by activity id in search-result order. An empty or
    /// `null` search result yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Schema`] if the search result is not a list or an
    /// entry lacks `activityId`, otherwise the first request failure.
    #[instrument(skip(self))]
    pub async fn fetch_activities(
        &self,
        search: &ActivitySearch,
    ) -> Result<Map<String, Value>, FetchError> {
        let unit = search.fetch_unit();
        let listing = self
            .connect
            .modern()
            .get_json(unit.path(), unit.params())
            .await?;

        let summaries = match &listing {
            Value::Array(items) => items.as_slice(),
            Value::Null => &[],
            _ => {
                return Err(SchemaError::missing_field("[activities]", "activity search").into());
            }
        };
        info!(count = summaries.len(), "activity search returned");

        let progress = self.progress_bar(summaries.len() as u64, "activities");
        let mut activities = Map::new();
        for summary in summaries {
            let activity_id = require_id(summary, "activityId", "activity search result")?;
            debug!(activity_id = %activity_id, "fetching activity detail");
            let detail = self
                .connect
                .activity_service()
                .get_json(&activity_id, NO_PARAMS)
                .await?;
            activities.insert(activity_id, detail);
            progress.inc(1);
            self.pause().await;
        }

        progress.finish_and_clear();
        Ok(activities)
    }

    /// Fetches the activity type catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] if the request fails.
    pub async fn fetch_activity_types(&self) -> Result<Value, FetchError> {
        let types = self
            .connect
            .activity_service()
            .get_json(ACTIVITY_TYPES_ROUTE, NO_PARAMS)
            .await?;
        self.pause().await;
        Ok(types)
    }

    /// Downloads the raw monitoring archive of each day in the range.
    ///
    /// # Errors
    ///
    /// See [`fetch_range`](Self::fetch_range).
    #[instrument(skip(self))]
    pub async fn fetch_monitoring(
        &self,
        start: NaiveDate,
        day_count: u32,
    ) -> Result<Vec<(NaiveDate, Vec<u8>)>, FetchError> {
        let progress = self.progress_bar(u64::from(day_count), "days");
        let mut archives = Vec::with_capacity(day_count as usize);

        for date in start.iter_days().take(day_count as usize) {
            let unit = monitoring_unit(date);
            let bytes = self
                .connect
                .download_service()
                .get_bytes(unit.path(), unit.params())
                .await?;
            debug!(%date, bytes = bytes.len(), "monitoring archive downloaded");
            archives.push((date, bytes));
            progress.inc(1);
            self.pause().await;
        }

        progress.finish_and_clear();
        Ok(archives)
    }

    async fn pause(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }

    fn progress_bar(&self, len: u64, unit: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(unit);
        bar
    }
}
