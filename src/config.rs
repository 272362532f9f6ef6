// src/config.rs
// =============================================================================
// Run configuration.
//
// The CLI (and its environment variable fallbacks) is parsed exactly once in
// main.rs and turned into a `ProbeConfig`. That value is then passed by
// reference to the parts of the pipeline that need it. There is no global
// mutable configuration anywhere in the crate.
// =============================================================================

use std::num::NonZeroUsize;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue, ACCEPT_ENCODING,
    USER_AGENT,
};
use serde::Serialize;
use thiserror::Error;

use crate::cli::Cli;

/// User-Agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("url-prober/", env!("CARGO_PKG_VERSION"));

/// Accept-Encoding sent unless overridden with `-H`. Bodies are not
/// decompressed, so body sizes are bytes on the wire.
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, br";

const DEFAULT_CONCURRENCY: usize = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How successful responses are bucketed in every line and in the histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StatusGranularity {
    /// The exact status code, e.g. "404"
    Exact,
    /// The code family, e.g. "4xx"
    #[default]
    Family,
}

/// Problems found while turning CLI input into a `ProbeConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("header '{0}' is not in 'Name: value' form")]
    MalformedHeader(String),

    #[error("invalid header name '{name}'")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },

    #[error("invalid value for header '{name}'")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },
}

/// Everything the probing pipeline needs to know, built once at startup
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Maximum number of fetches in flight
    pub concurrency: NonZeroUsize,
    /// Hard per-request timeout
    pub timeout: Duration,
    /// Probe at most this many URLs (None = the whole input)
    pub limit: Option<usize>,
    /// Headers applied to every request
    pub headers: HeaderMap,
    pub granularity: StatusGranularity,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let mut headers = base_headers();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            timeout: DEFAULT_TIMEOUT,
            limit: None,
            headers,
            granularity: StatusGranularity::default(),
        }
    }
}

impl ProbeConfig {
    /// Builds the configuration from parsed command-line arguments
    ///
    /// Fails if the user agent or one of the `--header` values cannot be
    /// used as an HTTP header.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut headers = base_headers();
        let user_agent = HeaderValue::from_str(&cli.user_agent).map_err(|source| {
            ConfigError::InvalidHeaderValue {
                name: USER_AGENT.to_string(),
                source,
            }
        })?;
        headers.insert(USER_AGENT, user_agent);

        // Later headers win, so "-H 'User-Agent: x'" overrides --user-agent
        for raw in &cli.headers {
            let (name, value) = parse_header(raw)?;
            headers.insert(name, value);
        }

        Ok(Self {
            concurrency: cli.concurrency,
            timeout: Duration::from_secs(cli.timeout.get()),
            limit: cli.limit.map(NonZeroUsize::get),
            headers,
            granularity: cli.status_granularity,
        })
    }
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(DEFAULT_ACCEPT_ENCODING));
    headers
}

/// Parses a "Name: value" pair as given to `--header`
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| ConfigError::MalformedHeader(raw.to_string()))?;
    let name = name.trim();

    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
        ConfigError::InvalidHeaderName {
            name: name.to_string(),
            source,
        }
    })?;
    let header_value =
        HeaderValue::from_str(value.trim()).map_err(|source| ConfigError::InvalidHeaderValue {
            name: name.to_string(),
            source,
        })?;

    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_header() {
        let (name, value) = parse_header("Accept-Encoding: gzip, deflate").unwrap();
        assert_eq!(name, "accept-encoding");
        assert_eq!(value, "gzip, deflate");
    }

    #[test]
    fn test_parse_header_keeps_colons_in_value() {
        let (name, value) = parse_header("Referer: https://example.com/").unwrap();
        assert_eq!(name, "referer");
        assert_eq!(value, "https://example.com/");
    }

    #[test]
    fn test_parse_header_without_colon() {
        let result = parse_header("no-colon-here");
        assert!(matches!(result, Err(ConfigError::MalformedHeader(_))));
    }

    #[test]
    fn test_parse_header_with_bad_name() {
        let result = parse_header("Bad Name: x");
        assert!(matches!(result, Err(ConfigError::InvalidHeaderName { .. })));
    }

    #[test]
    fn test_from_cli() {
        let cli = Cli::try_parse_from([
            "url-prober",
            "--concurrency",
            "3",
            "--timeout",
            "2",
            "--limit",
            "100",
            "--user-agent",
            "crawler-test",
            "-H",
            "X-Probe: yes",
        ])
        .unwrap();

        let config = ProbeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.concurrency.get(), 3);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.limit, Some(100));
        assert_eq!(config.headers[USER_AGENT], "crawler-test");
        assert_eq!(config.headers["x-probe"], "yes");
    }

    #[test]
    fn test_header_overrides_user_agent() {
        let cli = Cli::try_parse_from(["url-prober", "-H", "User-Agent: from-header"]).unwrap();
        let config = ProbeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.headers[USER_AGENT], "from-header");
    }

    #[test]
    fn test_accept_encoding_default_and_override() {
        let cli = Cli::try_parse_from(["url-prober"]).unwrap();
        let config = ProbeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.headers[ACCEPT_ENCODING], DEFAULT_ACCEPT_ENCODING);

        let cli = Cli::try_parse_from(["url-prober", "-H", "Accept-Encoding: identity"]).unwrap();
        let config = ProbeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.headers[ACCEPT_ENCODING], "identity");
        assert_eq!(config.headers.get_all(ACCEPT_ENCODING).iter().count(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.concurrency.get(), 10);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.headers[USER_AGENT], DEFAULT_USER_AGENT);
        assert_eq!(config.headers[ACCEPT_ENCODING], DEFAULT_ACCEPT_ENCODING);
        assert_eq!(config.granularity, StatusGranularity::Family);
    }
}
