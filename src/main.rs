//! # Qiita Search
//!
//! Command-line front end: searches Qiita for a keyword, walks the result
//! pages, and prints one entry per article found.
//!
//! ## Usage
//!
//! ```sh
//! qiita_search "rust async" 3 --mode sequential
//! ```

use clap::Parser;
use qiita_search::config::ScraperConfig;
use qiita_search::error::PipelineError;
use qiita_search::fetcher::HttpFetcher;
use qiita_search::models::SearchOutcome;
use qiita_search::paginator::Paginator;
use qiita_search::pipeline::{Pipeline, SearchRequest};
use qiita_search::utils::format_record;
use std::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("qiita_search starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let config = match &args.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    let config = args.apply_overrides(config);
    config.validate()?;

    let pipeline = Pipeline::new(HttpFetcher::new(&config)?, Paginator::new(&config)?);
    let request = SearchRequest {
        keyword: args.keyword.clone(),
        sort: args.sort,
        page_limit: args.limit,
        mode: args.mode,
    };

    // ---- Ctrl-C cancels the run; finished pages are still printed ----
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling search");
            on_signal.cancel();
        }
    });

    let result = pipeline.search(&request, &cancel).await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(outcome) => {
            print_outcome(&outcome, args.json)?;
            info!(
                ?elapsed,
                secs = elapsed.as_secs(),
                millis = elapsed.subsec_millis(),
                records = outcome.records.len(),
                failed_pages = outcome.failed_pages.len(),
                failed_fragments = outcome.failed_fragments,
                "Execution complete"
            );
            Ok(())
        }
        Err(PipelineError::Cancelled { partial }) => {
            print_outcome(&partial, args.json)?;
            warn!(?elapsed, records = partial.records.len(), "Search stopped early");
            Err(PipelineError::Cancelled { partial }.into())
        }
        Err(e) => {
            error!(error = %e, "Search failed");
            Err(e.into())
        }
    }
}

fn print_outcome(outcome: &SearchOutcome, json: bool) -> Result<(), Box<dyn Error>> {
    for (i, record) in outcome.records.iter().enumerate() {
        if json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("{}", format_record(i, record));
        }
    }
    Ok(())
}
