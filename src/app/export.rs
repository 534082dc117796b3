//! Export orchestration: login, then each requested resource in turn.

use std::time::Duration;

use anyhow::{Context, Result};
use garmin_core::{
    ActivitySearch, AuthContext, AuthFlow, DailyStat, Fetcher, GarminConnect, JsonStore, collate,
};
use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use crate::app::config_manager::ExportPlan;
use crate::cli::Stat;

/// Counters reported once the run finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExportSummary {
    pub(crate) files_written: usize,
    pub(crate) activities: usize,
}

/// Runs one export. A failed login aborts before anything is fetched; any
/// later failure aborts the remaining resources, leaving earlier files on disk.
#[instrument(skip_all, fields(start = %plan.start_date, end = %plan.end_date))]
pub(crate) async fn run_export(
    connect: GarminConnect,
    plan: &ExportPlan,
    pacing: Duration,
    show_progress: bool,
) -> Result<ExportSummary> {
    let store = JsonStore::new(&plan.output_dir);
    let mut summary = ExportSummary::default();

    let auth = AuthFlow::new(&connect, plan.credentials.clone())
        .login()
        .await
        .context("Login to Garmin Connect failed")?;
    store
        .write_json("profile", &profile_document(&auth))
        .await
        .context("Failed to save profile")?;
    summary.files_written += 1;

    let fetcher = Fetcher::new(connect, auth)
        .with_pacing(pacing)
        .with_progress(show_progress);

    let mut activities = Map::new();
    let mut daily: Vec<(DailyStat, Vec<Value>)> = Vec::new();

    for stat in &plan.stats {
        match stat {
            Stat::ActivityTypes => {
                let types = fetcher
                    .fetch_activity_types()
                    .await
                    .context("Failed to download activity types")?;
                store.write_json("activity_types", &types).await?;
                summary.files_written += 1;
            }
            Stat::Activities => {
                let mut search = ActivitySearch::new(plan.start_date, plan.end_date);
                if let Some(limit) = plan.activity_limit {
                    search = search.with_limit(limit);
                }
                activities = fetcher
                    .fetch_activities(&search)
                    .await
                    .context("Failed to download activities")?;
                for (activity_id, detail) in &activities {
                    store
                        .write_json(&format!("activity_{activity_id}"), detail)
                        .await?;
                }
                summary.activities = activities.len();
                summary.files_written += activities.len();
                info!(count = activities.len(), "activities saved");
            }
            Stat::Monitoring => {
                let archives = fetcher
                    .fetch_monitoring(plan.start_date, plan.day_count)
                    .await
                    .context("Failed to download monitoring archives")?;
                for (date, bytes) in &archives {
                    store
                        .write_bytes(&format!("monitoring_{date}"), "zip", bytes)
                        .await?;
                }
                summary.files_written += archives.len();
            }
            daily_stat => {
                let Some(daily_stat) = daily_stat.daily() else {
                    continue;
                };
                let documents = fetcher
                    .fetch_daily(daily_stat, plan.start_date, plan.day_count)
                    .await
                    .with_context(|| format!("Failed to download {daily_stat} data"))?;
                for (date, document) in plan.start_date.iter_days().zip(&documents) {
                    let name = format!("{}_{date}", daily_stat.file_prefix());
                    store.write_json(&name, document).await?;
                }
                summary.files_written += documents.len();
                daily.push((daily_stat, documents));
            }
        }
    }

    let has_collatable = plan.stats.contains(&Stat::Activities) || !daily.is_empty();
    if plan.collate && has_collatable {
        let records = collate(plan.start_date, plan.day_count, &activities, &daily)
            .context("Failed to collate downloads by day")?;
        let name = format!("interval_{}_{}", plan.start_date, plan.end_date);
        let path = store.write_json(&name, &records).await?;
        summary.files_written += 1;
        info!(path = %path.display(), days = records.len(), "collated interval written");
    }

    Ok(summary)
}

fn profile_document(auth: &AuthContext) -> Value {
    json!({
        "displayName": auth.display_name(),
        "fullName": auth.full_name(),
        "userPreferences": auth.user_preferences(),
        "socialProfile": auth.social_profile(),
    })
}
