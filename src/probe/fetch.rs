// src/probe/fetch.rs
// =============================================================================
// This module probes one URL with one HTTP GET request.
//
// Key functionality:
// - Builds a GET request with the configured headers and timeout
// - Reads the whole body so we can report its exact size
// - Turns every possible failure into a Classification instead of an error
// - Measures latency from before the request is built until we know the outcome
//
// Rust concepts:
// - Traits: `Fetcher` lets tests swap the real HTTP client for a fake one
// - Error source chains: we walk `source()` to find out why a request failed
// =============================================================================

use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::time::{Instant, SystemTime};

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response};
use url::Url;

use super::outcome::{Classification, FetchOutcome, TransportErrorKind};
use crate::config::ProbeConfig;

/// Anything that can turn a URL into a `FetchOutcome`
///
/// Implementations must never panic on bad input: every URL maps to exactly
/// one outcome.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: String) -> impl Future<Output = FetchOutcome> + Send;
}

/// The real fetcher, backed by a shared reqwest client
///
/// The client is built once. It keeps a connection pool, so cloning it per
/// request (as the tasks do through an `Arc<HttpFetcher>`) is cheap.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher that applies `config.headers` and `config.timeout`
    /// to every request
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout) // covers connect, headers and body
            .default_headers(config.headers.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    // Returns the classification plus the body size on success
    async fn execute(&self, url: &str) -> (Classification, Option<u64>) {
        // Parse up front so a malformed line never reaches the network
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("{url}: not a valid URL: {e}");
                return (Classification::RequestError, None);
            }
        };

        match self.client.get(parsed).send().await {
            Ok(response) => read_response(response).await,
            Err(e) => (categorize_error(&e), None),
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: String) -> FetchOutcome {
        let started_at = SystemTime::now();
        let start = Instant::now();

        let (classification, body_size) = self.execute(&url).await;
        let latency = start.elapsed();

        debug!("{url}: {classification} after {latency:?}");

        let outcome = FetchOutcome::new(url, classification, latency, started_at);
        match body_size {
            Some(body_size) => outcome.with_body_size(body_size),
            None => outcome,
        }
    }
}

// Reads the body of a response we already have headers for
//
// The status code is only reported once the body made it through. A body
// that fails halfway is a READ_BODY_ERROR (or a TIMEOUT if the clock ran out).
async fn read_response(response: Response) -> (Classification, Option<u64>) {
    let status = response.status().as_u16();

    match response.bytes().await {
        Ok(body) => (Classification::Status(status), Some(body.len() as u64)),
        Err(e) if e.is_timeout() => (Classification::Transport(TransportErrorKind::Timeout), None),
        Err(e) => {
            debug!("failed to read body: {e}");
            (Classification::ReadBodyError, None)
        }
    }
}

// Categorizes different error types from reqwest
//
// reqwest only exposes a few coarse predicates (is_timeout, is_connect, ...),
// so for connection problems we dig through the error's source chain and look
// at the underlying io::Error kind and the messages hyper/rustls attach.
fn categorize_error(error: &reqwest::Error) -> Classification {
    if error.is_builder() {
        // e.g. unsupported scheme like ftp://
        return Classification::RequestError;
    }
    if error.is_timeout() {
        return Classification::Transport(TransportErrorKind::Timeout);
    }

    // Skip reqwest's own message: it embeds the URL, which could match a keyword
    Classification::Transport(transport_kind(error.source()))
}

fn transport_kind(mut source: Option<&(dyn StdError + 'static)>) -> TransportErrorKind {
    while let Some(err) = source {
        if let Some(kind) = kind_from_message(&err.to_string()) {
            return kind;
        }
        if let Some(io_error) = err.downcast_ref::<io::Error>() {
            if let Some(kind) = kind_from_io(io_error) {
                return kind;
            }
        }
        source = err.source();
    }

    TransportErrorKind::Other
}

fn kind_from_io(error: &io::Error) -> Option<TransportErrorKind> {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => Some(TransportErrorKind::ConnectionRefused),
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => Some(TransportErrorKind::ConnectionReset),
        io::ErrorKind::TimedOut => Some(TransportErrorKind::Timeout),
        _ => None,
    }
}

// hyper reports resolver failures as "dns error: ..." and the TLS stack does
// not expose typed errors through reqwest, so these two are matched on text.
// A peer that hangs up before sending a response is treated as a reset.
fn kind_from_message(message: &str) -> Option<TransportErrorKind> {
    let message = message.to_lowercase();

    if message.contains("dns error") || message.contains("failed to lookup address") {
        Some(TransportErrorKind::Dns)
    } else if message.contains("certificate")
        || message.contains("tls")
        || message.contains("ssl")
        || message.contains("handshake")
        || message.contains("received corrupt message")
    {
        Some(TransportErrorKind::Tls)
    } else if message.contains("connection refused") {
        Some(TransportErrorKind::ConnectionRefused)
    } else if message.contains("connection reset")
        || message.contains("connection closed before message completed")
    {
        Some(TransportErrorKind::ConnectionReset)
    } else {
        None
    }
}
