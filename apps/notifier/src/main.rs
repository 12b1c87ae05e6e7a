#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use vigil::notify::{self, Notifier};

/// Environment variable naming the webhook delivery endpoint.
const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

/// Deliver webhook notifications for recorded status changes.
#[derive(Debug, Parser)]
#[command(name = "vigil-notifier", version, about)]
struct Cli {
    /// JSON file containing an array of change records.
    changes_file: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    logger::init();

    // A missing or extra argument is a usage error: report it on stderr
    // and exit 1 instead of clap's default exit code.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();
    let webhook_url =
        env::var(WEBHOOK_ENV).with_context(|| format!("{WEBHOOK_ENV} is not set"))?;

    let changes = notify::load_changes(&cli.changes_file)?;
    if changes.is_empty() {
        info!("no status changes to notify");
        return Ok(());
    }

    let notifier = Notifier::new(webhook_url)?;
    let failures = notifier.deliver_all(&changes).await;
    info!("delivered {}/{} notifications", changes.len() - failures, changes.len());

    Ok(())
}
