//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use garmin_core::DailyStat;

/// Download health statistics and activities from Garmin Connect.
///
/// Signs in with your Garmin Connect account, then fetches each requested
/// statistic one day at a time and writes the JSON documents to disk.
#[derive(Parser, Debug)]
#[command(name = "garmin-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Garmin Connect username (falls back to the config file)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Garmin Connect password (falls back to the config file)
    #[arg(short, long)]
    pub password: Option<String>,

    /// First day to download (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start_date: NaiveDate,

    /// Last day to download, inclusive (YYYY-MM-DD, defaults to the start date)
    #[arg(long, value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Directory downloaded files are written to (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Resource to download; repeat to select several (defaults to all)
    #[arg(short, long = "stat", value_enum)]
    pub stats: Vec<Stat>,

    /// Maximum number of activities returned by the activity search
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub activity_limit: Option<u32>,

    /// Skip writing the per-day collated interval file
    #[arg(long)]
    pub no_collate: bool,

    /// Read defaults from this config file instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// A downloadable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Stat {
    Activities,
    ActivityTypes,
    Summary,
    Hydration,
    Sleep,
    Weight,
    Rhr,
    Monitoring,
}

impl Stat {
    /// Every resource, in download order.
    pub const ALL: [Self; 8] = [
        Self::ActivityTypes,
        Self::Activities,
        Self::Summary,
        Self::Hydration,
        Self::Sleep,
        Self::Weight,
        Self::Rhr,
        Self::Monitoring,
    ];

    /// The per-day statistic this resource maps to, if any.
    #[must_use]
    pub fn daily(self) -> Option<DailyStat> {
        match self {
            Self::Summary => Some(DailyStat::Summary),
            Self::Hydration => Some(DailyStat::Hydration),
            Self::Sleep => Some(DailyStat::Sleep),
            Self::Weight => Some(DailyStat::Weight),
            Self::Rhr => Some(DailyStat::RestingHeartRate),
            Self::Activities | Self::ActivityTypes | Self::Monitoring => None,
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected a date as YYYY-MM-DD: {e}"))
}
