//! Regrouping of downloaded documents into one record per calendar day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::fetch::DailyStat;
use crate::schema::{SchemaError, require_str};

const START_TIME_LOCAL: &str = "summaryDTO.startTimeLocal";
const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Everything downloaded for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayRecord {
    /// Activity details keyed by activity id, in download order.
    pub activities: Map<String, Value>,
    /// One document per daily statistic, keyed by its short name.
    pub stats: BTreeMap<String, Value>,
}

/// Builds one [`DayRecord`] per day of `[start, start + day_count)`.
///
/// Activities land on the day of their local start time. The documents of
/// each daily statistic are matched to days by position, so they must be in
/// date order as returned by the fetch loop. Activities starting outside the
/// range are dropped.
///
/// # Errors
///
/// Returns [`SchemaError`] if an activity lacks a parseable
/// `summaryDTO.startTimeLocal`.
pub fn collate(
    start: NaiveDate,
    day_count: u32,
    activities: &Map<String, Value>,
    daily: &[(DailyStat, Vec<Value>)],
) -> Result<BTreeMap<NaiveDate, DayRecord>, SchemaError> {
    let days: Vec<NaiveDate> = start.iter_days().take(day_count as usize).collect();
    let mut records: BTreeMap<NaiveDate, DayRecord> = days
        .iter()
        .map(|date| (*date, DayRecord::default()))
        .collect();

    for (activity_id, detail) in activities {
        let date = activity_date(activity_id, detail)?;
        if let Some(record) = records.get_mut(&date) {
            record.activities.insert(activity_id.clone(), detail.clone());
        }
    }

    for (stat, documents) in daily {
        for (date, document) in days.iter().zip(documents) {
            if let Some(record) = records.get_mut(date) {
                record.stats.insert(stat.as_str().to_string(), document.clone());
            }
        }
    }

    Ok(records)
}

fn activity_date(activity_id: &str, detail: &Value) -> Result<NaiveDate, SchemaError> {
    let context = format!("activity {activity_id}");
    let raw = require_str(detail, START_TIME_LOCAL, &context)?;
    NaiveDateTime::parse_from_str(raw, START_TIME_FORMAT)
        .map(|started| started.date())
        .map_err(|_| SchemaError::missing_field(START_TIME_LOCAL, &context))
}
