use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use garmin_core::{GarminConnect, PAGE_DELAY, Session};
use tracing::{debug, info};

use crate::app::{config_manager, export, terminal};
use crate::cli::Args;

pub(crate) async fn run_downloader() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let resolved = config_manager::resolve_config(&args)?;
    terminal::init_tracing(resolved.default_log_level);

    if let Some(path) = resolved.config_path.as_deref() {
        debug!(path = %path.display(), "Loaded config file");
    }
    let plan = resolved.plan;
    debug!(stats = ?plan.stats, collate = plan.collate, "Run plan resolved");
    info!(
        start = %plan.start_date,
        end = %plan.end_date,
        output_dir = %plan.output_dir.display(),
        "Garmin downloader starting"
    );

    let session = Session::new().context("Failed to create HTTP session")?;
    let show_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let summary = export::run_export(
        GarminConnect::new(session),
        &plan,
        PAGE_DELAY,
        show_progress,
    )
    .await?;

    info!(
        files = summary.files_written,
        activities = summary.activities,
        "Download complete"
    );
    Ok(())
}
