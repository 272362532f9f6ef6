// src/report/mod.rs
// =============================================================================
// Everything the user sees on stdout.
//
// Two kinds of output:
// - One CSV line per URL, printed the moment its outcome arrives
//     url,classification,start_time,latency_ms,body_size
// - The final report, either as human-readable text or as JSON
//
// Logs and warnings go to stderr (see logging.rs), so stdout stays easy to
// pipe into other tools.
// =============================================================================

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;

use crate::config::StatusGranularity;
use crate::probe::FetchOutcome;
use crate::stats::{HistogramEntry, Statistics};

/// What to print while the run is in progress and at the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Per-URL lines, then the text report
    Stream,
    /// Only the text report
    SummaryOnly,
    /// Only the JSON report
    Json,
}

impl OutputMode {
    pub fn from_flags(summary_only: bool, json: bool) -> Self {
        if json {
            Self::Json
        } else if summary_only {
            Self::SummaryOnly
        } else {
            Self::Stream
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    mode: OutputMode,
    granularity: StatusGranularity,
}

impl Reporter {
    pub fn new(mode: OutputMode, granularity: StatusGranularity) -> Self {
        Self { mode, granularity }
    }

    /// Called for every outcome as it arrives
    ///
    /// A closed stdout (e.g. piped into `head`) does not stop the run.
    pub fn outcome(&self, outcome: &FetchOutcome) {
        let written = self.write_outcome(&mut io::stdout().lock(), outcome);
        if let Err(e) = ignore_broken_pipe(written) {
            warn!("failed to write result for {}: {e}", outcome.url);
        }
    }

    /// Prints the final report
    pub fn summary(&self, stats: &Statistics) -> Result<()> {
        ignore_broken_pipe(self.write_summary(&mut io::stdout().lock(), stats))
            .context("Failed to write summary")
    }

    fn write_outcome<W: Write>(&self, out: &mut W, outcome: &FetchOutcome) -> io::Result<()> {
        if self.mode == OutputMode::Stream {
            writeln!(out, "{}", format_line(outcome, self.granularity))?;
        }
        Ok(())
    }

    fn write_summary<W: Write>(&self, out: &mut W, stats: &Statistics) -> io::Result<()> {
        match self.mode {
            OutputMode::Json => {
                let json_output = serde_json::to_string_pretty(&JsonReport::from(stats))?;
                writeln!(out, "{json_output}")?;
            }
            OutputMode::Stream | OutputMode::SummaryOnly => {
                writeln!(out)?;
                write!(out, "{}", format_summary(stats))?;
            }
        }
        out.flush()
    }
}

// The reader went away; nothing left to print to
fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// One CSV line for one outcome. Body size is 0 when nothing was read.
pub fn format_line(outcome: &FetchOutcome, granularity: StatusGranularity) -> String {
    format!(
        "{},{},{},{},{}",
        outcome.url,
        outcome.classification.label(granularity),
        humantime::format_rfc3339_millis(outcome.started_at),
        outcome.latency.as_millis(),
        outcome.body_size.unwrap_or(0)
    )
}

/// The human-readable final report
pub fn format_summary(stats: &Statistics) -> String {
    let mut out = String::new();

    out.push_str("📊 Summary:\n");
    out.push_str(&format!("   Total time:    {:.2}s\n", stats.elapsed.as_secs_f64()));
    out.push_str(&format!("   Total URLs:    {}\n", stats.total));
    out.push_str(&format!("   Average time:  {}\n", millis(stats.average_latency)));
    out.push_str(&format!("   Median time:   {}\n", millis(stats.median_latency)));
    out.push_str(&format!("   Max time:      {}\n", millis(stats.max_latency)));

    let ratio = stats
        .success_ratio()
        .map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0));
    out.push_str(&format!(
        "   ✅ OK (2xx):    {} ({ratio}, {:.1}/s)\n",
        stats.success_count,
        stats.success_per_second()
    ));
    if let Some(size) = stats.average_body_size {
        out.push_str(&format!("   Avg body size: {size} bytes\n"));
    }

    if !stats.histogram.is_empty() {
        out.push('\n');
        for entry in &stats.histogram {
            out.push_str(&format!("   {}: {}\n", entry.label, entry.count));
        }
    }

    out
}

fn millis(duration: Option<Duration>) -> String {
    duration.map_or_else(|| "n/a".to_string(), |d| format!("{}ms", d.as_millis()))
}

// Machine-readable report; all durations in milliseconds
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    total_urls: usize,
    time_ms: u64,
    avg_ms: Option<u64>,
    median_ms: Option<u64>,
    max_ms: Option<u64>,
    ok_count: usize,
    ok_ratio: Option<f64>,
    ok_per_sec: f64,
    avg_body_size: Option<u64>,
    granularity: StatusGranularity,
    histogram: &'a [HistogramEntry],
}

impl<'a> From<&'a Statistics> for JsonReport<'a> {
    fn from(stats: &'a Statistics) -> Self {
        let ms = |d: Duration| d.as_millis() as u64;
        Self {
            total_urls: stats.total,
            time_ms: ms(stats.elapsed),
            avg_ms: stats.average_latency.map(ms),
            median_ms: stats.median_latency.map(ms),
            max_ms: stats.max_latency.map(ms),
            ok_count: stats.success_count,
            ok_ratio: stats.success_ratio(),
            ok_per_sec: stats.success_per_second(),
            avg_body_size: stats.average_body_size,
            granularity: stats.granularity,
            histogram: &stats.histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Classification, TransportErrorKind};
    use crate::stats::aggregate;
    use crate::test_utils::outcome;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_output_mode_from_flags() {
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Stream);
        assert_eq!(OutputMode::from_flags(true, false), OutputMode::SummaryOnly);
        assert_eq!(OutputMode::from_flags(false, true), OutputMode::Json);
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Json);
    }

    // Behaves like stdout after the reading end of a pipe was closed
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_closed_stdout_is_not_an_error() {
        let reporter = Reporter::new(OutputMode::Stream, StatusGranularity::Family);
        let ok = outcome("https://example.com", Classification::Status(200), 1);
        let stats = aggregate(&[ok.clone()], StatusGranularity::Family, Duration::from_secs(1));

        let line = reporter.write_outcome(&mut ClosedPipe, &ok);
        assert_eq!(line.as_ref().map_err(io::Error::kind), Err(io::ErrorKind::BrokenPipe));
        assert!(ignore_broken_pipe(line).is_ok());
        assert!(ignore_broken_pipe(reporter.write_summary(&mut ClosedPipe, &stats)).is_ok());
    }

    #[test]
    fn test_other_write_errors_are_kept() {
        let denied = Err(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(ignore_broken_pipe(denied).is_err());
    }

    #[test]
    fn test_written_output_per_mode() {
        let ok = outcome("https://example.com", Classification::Status(200), 7).with_body_size(3);
        let stats = aggregate(&[ok.clone()], StatusGranularity::Family, Duration::from_secs(1));

        let mut out = Vec::new();
        let reporter = Reporter::new(OutputMode::Stream, StatusGranularity::Family);
        reporter.write_outcome(&mut out, &ok).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://example.com,2xx,1970-01-01T00:00:00.000Z,7,3\n"
        );

        let mut out = Vec::new();
        let reporter = Reporter::new(OutputMode::Json, StatusGranularity::Family);
        reporter.write_outcome(&mut out, &ok).unwrap();
        assert!(out.is_empty());
        reporter.write_summary(&mut out, &stats).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_urls"], 1);
    }

    #[test]
    fn test_format_line_success() {
        let ok = outcome("https://example.com", Classification::Status(200), 42).with_body_size(512);
        assert_eq!(
            format_line(&ok, StatusGranularity::Exact),
            "https://example.com,200,1970-01-01T00:00:00.000Z,42,512"
        );
    }

    #[test]
    fn test_format_line_failure() {
        let timeout = outcome(
            "https://slow.example",
            Classification::Transport(TransportErrorKind::Timeout),
            5000,
        );
        assert_eq!(
            format_line(&timeout, StatusGranularity::Family),
            "https://slow.example,TIMEOUT,1970-01-01T00:00:00.000Z,5000,0"
        );
    }

    #[test]
    fn test_format_summary() {
        let outcomes = vec![
            outcome("a", Classification::Status(200), 10).with_body_size(10),
            outcome("b", Classification::Status(200), 20).with_body_size(30),
            outcome("c", Classification::Status(404), 30).with_body_size(0),
            outcome("d", Classification::Transport(TransportErrorKind::ConnectionRefused), 40),
        ];
        let stats = aggregate(&outcomes, StatusGranularity::Family, Duration::from_secs(2));

        let summary = format_summary(&stats);
        assert!(summary.contains("Total time:    2.00s"), "{summary}");
        assert!(summary.contains("Total URLs:    4"));
        assert!(summary.contains("Average time:  25ms"));
        assert!(summary.contains("Median time:   30ms"));
        assert!(summary.contains("Max time:      40ms"));
        assert!(summary.contains("OK (2xx):    2 (50.0%, 1.0/s)"));
        assert!(summary.contains("Avg body size: 20 bytes"));
        assert!(summary.contains("   2xx: 2\n"));
        assert!(summary.contains("   CONNECTION_REFUSED: 1\n"));
    }

    #[test]
    fn test_format_summary_empty_run() {
        let stats = aggregate(&[], StatusGranularity::Family, Duration::ZERO);
        let summary = format_summary(&stats);
        assert!(summary.contains("Total URLs:    0"));
        assert!(summary.contains("Average time:  n/a"));
        assert!(summary.contains("Median time:   n/a"));
    }

    #[test]
    fn test_json_report() {
        let outcomes = vec![
            outcome("a", Classification::Status(200), 10).with_body_size(100),
            outcome("b", Classification::Status(200), 20).with_body_size(200),
            outcome("c", Classification::Status(200), 30).with_body_size(300),
            outcome("d", Classification::Status(500), 40).with_body_size(1),
        ];
        let stats = aggregate(&outcomes, StatusGranularity::Exact, Duration::from_secs(1));

        let value = serde_json::to_value(JsonReport::from(&stats)).unwrap();
        assert_eq!(
            value,
            json!({
                "total_urls": 4,
                "time_ms": 1000,
                "avg_ms": 25,
                "median_ms": 30,
                "max_ms": 40,
                "ok_count": 3,
                "ok_ratio": 0.75,
                "ok_per_sec": 3.0,
                "avg_body_size": 200,
                "granularity": "exact",
                "histogram": [
                    { "label": "200", "count": 3 },
                    { "label": "500", "count": 1 }
                ]
            })
        );
    }
}
