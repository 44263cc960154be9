use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use grade_alert::config::Config;
use grade_alert::jobs::PendingGradesJob;
use grade_alert::logging::init_logging;
use grade_alert::services::{CanvasClient, EmailService};
use persistence::repositories::AlertConfigRepository;

/// Emails instructors about Canvas submissions that are waiting to be graded.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Base configuration file, without extension.
    #[clap(long, default_value = "config/default")]
    config: String,

    /// Log notifications instead of sending them and leave the registry untouched.
    #[clap(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let overrides: &[(&str, &str)] = if cli.dry_run {
        &[("email.provider", "console")]
    } else {
        &[]
    };
    let config = Config::load(&cli.config, overrides)?;

    init_logging(&config.logging);

    info!("Starting grade-alert v{}", env!("CARGO_PKG_VERSION"));

    if cli.dry_run {
        info!("Dry run: emails are logged and date_last_ran is not updated");
    }

    let registry = AlertConfigRepository::new(&(&config.database).into());
    let platform = CanvasClient::new(&config.canvas)?;
    let template = config.email.template();
    let mailer = EmailService::new(config.email.clone())?;

    let mut job = PendingGradesJob::new(
        Arc::new(registry),
        Arc::new(platform),
        Arc::new(mailer),
        template,
        config.recipients,
    );
    if cli.dry_run {
        job = job.without_recording();
    }

    let summary = job.run().await;

    info!(
        alerts = summary.alerts,
        notified = summary.notified,
        skipped = summary.skipped,
        failed = summary.failed,
        "Run finished"
    );

    Ok(())
}
