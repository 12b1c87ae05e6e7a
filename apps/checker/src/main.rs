#![warn(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use vigil::config::Config;
use vigil::engine::CheckerEngine;
use vigil::probe::HttpProber;
use vigil::store::{ChangeLog, StatusStore};

/// Check every configured target once and record the results.
#[derive(Debug, Parser)]
#[command(name = "vigil-checker", version, about)]
struct Cli {
    /// Path to the target configuration file.
    #[arg(long, default_value = "data/servers.json")]
    config: PathBuf,

    /// Directory holding the status store and change log.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        // Any DOWN target makes the run exit non-zero.
        Ok(down_count) if down_count > 0 => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<usize> {
    let config = Config::load(&cli.config)?;
    info!("loaded {} targets from {}", config.servers.len(), cli.config.display());

    fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("failed to create data directory {}", cli.data_dir.display()))?;
    let status_path = cli.data_dir.join("current-status.json");
    let changes_path = cli.data_dir.join("status-changes.json");

    let prior = StatusStore::load(&status_path);
    let mut change_log = ChangeLog::load(&changes_path);

    let engine = CheckerEngine::new(Box::new(HttpProber::new()?));
    let outcome = engine.run_once(&config, &prior).await;

    // Status snapshot first, change history second; each write is atomic
    // on its own but the pair is not.
    outcome.store.save(&status_path)?;
    if !outcome.changes.is_empty() {
        change_log.append(outcome.changes);
        change_log.save(&changes_path)?;
    }

    let summary = outcome.summary;
    info!(
        "check complete: {} targets, {} up, {} down, {} changes",
        summary.total, summary.up, summary.down, summary.changes
    );

    Ok(summary.down)
}
