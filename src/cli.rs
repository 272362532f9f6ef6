// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every tuning knob can also come from an environment variable, so existing
// benchmark scripts that export CONCURRENCY / REQUEST_TIMEOUT / LIMIT keep
// working without passing flags.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - NonZero integers: Let the type system reject "0" for us
// =============================================================================

use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::StatusGranularity;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "url-prober",
    version,
    about = "Probe a list of URLs with bounded concurrency and report latency statistics",
    long_about = "url-prober issues one GET request per URL, keeps at most --concurrency requests \
                  in flight, and prints a status histogram together with average, median and max \
                  latency. URLs are read one per line from a file or from standard input."
)]
pub struct Cli {
    /// File with one URL per line. Reads standard input when omitted or "-"
    pub input: Option<PathBuf>,

    /// Maximum number of requests in flight at the same time
    #[arg(short, long, env = "CONCURRENCY", default_value = "10")]
    pub concurrency: NonZeroUsize,

    /// Per-request timeout in seconds (connect, headers and body)
    #[arg(short, long, env = "REQUEST_TIMEOUT", default_value = "5")]
    pub timeout: NonZeroU64,

    /// Only probe the first N URLs of the input
    #[arg(short, long, env = "LIMIT")]
    pub limit: Option<NonZeroUsize>,

    /// User-Agent header sent with every request
    #[arg(long, env = "USER_AGENT", default_value = crate::config::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Extra request header, e.g. --header "Accept-Encoding: identity"
    ///
    /// Can be given multiple times. "Accept-Encoding: gzip, deflate, br" is
    /// sent by default and can be overridden here.
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Report exact status codes ("404") or code families ("4xx")
    #[arg(long, value_enum, default_value_t = StatusGranularity::Family)]
    pub status_granularity: StatusGranularity,

    /// Skip the per-URL lines and only print the final report
    #[arg(long)]
    pub summary_only: bool,

    /// Output the final report in JSON format (implies --summary-only)
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
