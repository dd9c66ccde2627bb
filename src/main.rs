//! job-scraper binary: run hunt cycles until SIGTERM/SIGINT

use job_scraper::telemetry::init_tracing;
use job_scraper::{Config, CycleScheduler, JobHunter, Result, cancel_on_shutdown};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal outside local development
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("job-scraper: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.telemetry) {
        eprintln!("job-scraper: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, error_code = e.code(), "job-scraper failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    info!(
        env = %config.service.env,
        name = %config.service.name,
        version = %config.service.version,
        scraper = ?config.scraper.kind,
        store = ?config.store.kind,
        feeds = config.hunt.feeds.len(),
        "Starting job-scraper"
    );

    let hunter = Arc::new(JobHunter::new(
        config.build_scraper()?,
        config.build_store().await?,
        config.hunt.clone(),
    ));

    let stop = CancellationToken::new();
    let scheduler = tokio::spawn(
        CycleScheduler::new(hunter, config.schedule.clone()).start(stop.clone()),
    );

    cancel_on_shutdown(stop.clone()).await;
    info!("Shutting down");

    scheduler
        .await
        .map_err(|e| job_scraper::Error::Other(format!("Scheduler task failed: {}", e)))?
}
