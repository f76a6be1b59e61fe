use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use transfer_rumours_scraper::{
    run_scraper, transfermarkt::RumoursCrawler, Fetcher, FetcherConfig, Pacing, ScraperError,
    StopReason,
};

/// Collects the latest transfer rumours listing into a JSON file.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Listing URL, without the `page` parameter.
    #[arg(long, env = "BASE_URL")]
    base_url: Url,

    #[arg(short, long, default_value = "latest_rumours_all_pages_data.json")]
    output: PathBuf,

    /// Request the detailed listing view (`plus=1`).
    #[arg(long)]
    plus: bool,
}

async fn run(args: Args) -> Result<(), ScraperError> {
    let fetcher = Fetcher::http(FetcherConfig::new(args.base_url).with_plus(args.plus))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let report = run_scraper(&RumoursCrawler, &fetcher, &Pacing::default(), shutdown_rx).await;

    match &report.stop {
        StopReason::Interrupted => {
            warn!(
                "Process interrupted by user after {} pages, {} players collected, nothing written",
                report.pages,
                report.collected.len()
            );
            return Ok(());
        }
        StopReason::Failed(e) => warn!("Stopped early: {}", e),
        StopReason::NoResults | StopReason::LastPage => {}
    }

    info!(
        "Successfully collected {} players from {} pages",
        report.collected.len(),
        report.pages
    );
    report.collected.write_json(&args.output)?;
    info!("Data saved to {}", args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();

    info!("Starting scraper...");
    let start = Instant::now();

    if let Err(e) = run(args).await {
        error!("Critical error: {}", e);
    }

    info!("Execution time: {:.2} seconds", start.elapsed().as_secs_f64());
}
