//! Configuration lifecycle: load file config, merge CLI, validate the run.

use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use garmin_core::Credentials;

use crate::app::validation;
use crate::app_config::{FileConfig, VerbositySetting, load_config};
use crate::cli::{Args, Stat};

/// Everything one export run needs, after CLI and file config are merged.
#[derive(Debug, Clone)]
pub(crate) struct ExportPlan {
    pub(crate) credentials: Credentials,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) day_count: u32,
    pub(crate) output_dir: PathBuf,
    pub(crate) stats: Vec<Stat>,
    pub(crate) activity_limit: Option<u32>,
    pub(crate) collate: bool,
}

/// Resolved configuration bundle: the run plan plus the default log level.
pub(crate) struct ResolvedConfig {
    pub(crate) plan: ExportPlan,
    pub(crate) default_log_level: &'static str,
    pub(crate) config_path: Option<PathBuf>,
}

/// Load file config, merge CLI overrides, validate. CLI values win.
pub(crate) fn resolve_config(args: &Args) -> Result<ResolvedConfig> {
    let loaded = load_config(args.config.as_deref())?;
    let config_path = loaded.path.filter(|_| loaded.config.is_some());
    let file = loaded.config.unwrap_or_default();
    let default_log_level = resolve_default_log_level(args, file.verbosity);
    let plan = build_plan(args, file)?;
    Ok(ResolvedConfig {
        plan,
        default_log_level,
        config_path,
    })
}

/// Priority: quiet flag > verbose flag > config verbosity > info.
fn resolve_default_log_level(args: &Args, file: Option<VerbositySetting>) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => file.map_or("info", VerbositySetting::filter_directive),
        1 => "debug",
        _ => "trace",
    }
}

fn build_plan(args: &Args, file: FileConfig) -> Result<ExportPlan> {
    let end_date = args.end_date.unwrap_or(args.start_date);
    let day_count = validation::day_count(args.start_date, end_date)?;

    let username = args.username.clone().or(file.username).unwrap_or_default();
    let password = args.password.clone().or(file.password).unwrap_or_default();
    if username.is_empty() {
        bail!(
            "Missing Garmin Connect username.\n  \
             Pass --username or set `username` in the config file"
        );
    }
    if password.is_empty() {
        bail!(
            "Missing Garmin Connect password.\n  \
             Pass --password or set `password` in the config file"
        );
    }

    let mut stats = if args.stats.is_empty() {
        Stat::ALL.to_vec()
    } else {
        args.stats.clone()
    };
    stats.sort_by_key(|stat| Stat::ALL.iter().position(|s| s == stat));
    stats.dedup();

    Ok(ExportPlan {
        credentials: Credentials::new(username, password),
        start_date: args.start_date,
        end_date,
        day_count,
        output_dir: args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
        stats,
        activity_limit: args.activity_limit.or(file.activity_limit),
        collate: !args.no_collate,
    })
}
