// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments (and env vars) using clap
// 2. Build the run configuration once and set up logging
// 3. Open the URL list and probe every URL with bounded concurrency
// 4. Aggregate the outcomes and print the report
// 5. Exit with proper code (0 = run completed, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc: To share one HTTP client between all fetch tasks
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - run configuration built from the CLI
mod input; // src/input/ - reading the URL list
mod logging; // src/logging.rs - env_logger setup
mod probe; // src/probe/ - fetch, admission gate, dispatch, collection
mod report; // src/report/ - per-URL lines and the final report
mod stats; // src/stats/ - latency figures and the status histogram

#[cfg(test)]
mod test_utils;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use log::info;

use cli::Cli;
use config::ProbeConfig;
use probe::HttpFetcher;
use report::{OutputMode, Reporter};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = every URL was probed and reported (whatever their status)
//   Err = configuration or input problem, nothing was probed
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = ProbeConfig::from_cli(&cli)?;
    info!("Starting probe:");
    info!(" * concurrency: {}", config.concurrency);
    info!(" * request timeout: {:?}", config.timeout);
    match config.limit {
        Some(limit) => info!(" * url limit: {limit}"),
        None => info!(" * url limit: none"),
    }
    info!(" * status granularity: {:?}", config.granularity);

    // Fails before any request if the file cannot be opened
    let urls = input::open_urls(cli.input.as_deref()).await?;

    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let reporter = Reporter::new(
        OutputMode::from_flags(cli.summary_only, cli.json),
        config.granularity,
    );

    let started = Instant::now();
    let outcomes = probe::probe_all(urls, &config, fetcher, |outcome| {
        reporter.outcome(outcome)
    })
    .await?;
    let elapsed = started.elapsed();

    let statistics = stats::aggregate(&outcomes, config.granularity, elapsed);
    reporter.summary(&statistics)?;

    Ok(0)
}
