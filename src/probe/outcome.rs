// src/probe/outcome.rs
// =============================================================================
// The record produced by every single fetch.
//
// A fetch never "fails" from the pipeline's point of view: whatever happens
// (bad URL, DNS failure, timeout, 500, broken body) ends up as one
// `FetchOutcome` with a `Classification` describing what happened. That way
// every URL we dispatch shows up exactly once in the final report.
// =============================================================================

use std::fmt;
use std::time::{Duration, SystemTime};

use crate::config::StatusGranularity;

/// Network-level failure kinds we can tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request did not finish within the configured timeout
    Timeout,
    /// The hostname could not be resolved
    Dns,
    /// The remote host actively refused the connection
    ConnectionRefused,
    /// The connection was reset or aborted mid-flight
    ConnectionReset,
    /// TLS handshake or certificate problem
    Tls,
    /// Anything else the HTTP client reports
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "TIMEOUT",
            Self::Dns => "DNS_ERROR",
            Self::ConnectionRefused => "CONNECTION_REFUSED",
            Self::ConnectionReset => "CONNECTION_RESET",
            Self::Tls => "TLS_ERROR",
            Self::Other => "TRANSPORT_ERROR",
        };
        f.write_str(label)
    }
}

/// What happened to one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// We got a response with this status code and read its body
    Status(u16),
    /// The request could not even be built (malformed URL, bad scheme)
    RequestError,
    /// The request failed on the wire
    Transport(TransportErrorKind),
    /// Headers arrived but reading the body failed
    ReadBodyError,
}

impl Classification {
    /// Label used in output lines and as the histogram key
    ///
    /// Only status classifications are affected by `granularity`.
    pub fn label(&self, granularity: StatusGranularity) -> String {
        match (self, granularity) {
            (Self::Status(code), StatusGranularity::Exact) => code.to_string(),
            (Self::Status(code), StatusGranularity::Family) => format!("{}xx", code / 100),
            (Self::RequestError, _) => "REQUEST_ERROR".to_string(),
            (Self::ReadBodyError, _) => "READ_BODY_ERROR".to_string(),
            (Self::Transport(kind), _) => kind.to_string(),
        }
    }

    /// True for 2xx responses
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Status(code) if (200..300).contains(code))
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(StatusGranularity::Exact))
    }
}

/// The result of one fetch attempt
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// The URL exactly as it was read from the input
    pub url: String,
    pub classification: Classification,
    /// Time from just before building the request to the final classification
    pub latency: Duration,
    /// Body length in bytes; only set when the body was read successfully
    pub body_size: Option<u64>,
    /// Wall-clock time at which the fetch started
    pub started_at: SystemTime,
}

impl FetchOutcome {
    pub fn new(
        url: impl Into<String>,
        classification: Classification,
        latency: Duration,
        started_at: SystemTime,
    ) -> Self {
        Self {
            url: url.into(),
            classification,
            latency,
            body_size: None,
            started_at,
        }
    }

    /// Attaches the body size of a successful read
    #[must_use]
    pub fn with_body_size(mut self, body_size: u64) -> Self {
        self.body_size = Some(body_size);
        self
    }
}
