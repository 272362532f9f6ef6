// src/stats/aggregate.rs
// =============================================================================
// Turns the collected outcomes into the numbers we report.
//
// This is a pure function: same outcomes in, same Statistics out. It runs
// exactly once, after the pipeline has finished, so nothing here needs
// synchronization.
//
// Median: we sort latencies ascending and take index n / 2. For an even
// number of results this is the upper of the two middle values, e.g.
// [10, 20, 30, 40] ms -> 30 ms. No averaging of the two middle values.
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::config::StatusGranularity;
use crate::probe::FetchOutcome;

/// One histogram bucket: how many outcomes carried this label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramEntry {
    pub label: String,
    pub count: usize,
}

/// Immutable summary of a whole run
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Number of outcomes (== number of URLs probed)
    pub total: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
    pub average_latency: Option<Duration>,
    pub median_latency: Option<Duration>,
    pub max_latency: Option<Duration>,
    /// Number of 2xx outcomes
    pub success_count: usize,
    /// Mean body size over 2xx outcomes
    pub average_body_size: Option<u64>,
    /// Sorted by count, most frequent first
    pub histogram: Vec<HistogramEntry>,
    pub granularity: StatusGranularity,
}

/// Computes the statistics for one run
///
/// With no outcomes every latency figure is `None` instead of a division by
/// zero.
pub fn aggregate(
    outcomes: &[FetchOutcome],
    granularity: StatusGranularity,
    elapsed: Duration,
) -> Statistics {
    let total = outcomes.len();

    let mut latencies: Vec<Duration> = outcomes.iter().map(|o| o.latency).collect();
    latencies.sort_unstable();

    let average_latency = mean(latencies.iter().map(Duration::as_nanos))
        .map(|nanos| Duration::from_nanos(nanos as u64));
    let median_latency = latencies.get(total / 2).copied();
    let max_latency = latencies.last().copied();

    let successes: Vec<&FetchOutcome> = outcomes
        .iter()
        .filter(|o| o.classification.is_success())
        .collect();
    let body_sizes = successes.iter().map(|o| u128::from(o.body_size.unwrap_or(0)));
    let average_body_size = mean(body_sizes).map(|size| size as u64);

    Statistics {
        total,
        elapsed,
        average_latency,
        median_latency,
        max_latency,
        success_count: successes.len(),
        average_body_size,
        histogram: histogram(outcomes, granularity),
        granularity,
    }
}

// Counts per label, most frequent first. Equal counts come out in label order
// because the BTreeMap already iterates that way and the sort is stable.
fn histogram(outcomes: &[FetchOutcome], granularity: StatusGranularity) -> Vec<HistogramEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for outcome in outcomes {
        *counts
            .entry(outcome.classification.label(granularity))
            .or_insert(0) += 1;
    }

    let mut entries: Vec<HistogramEntry> = counts
        .into_iter()
        .map(|(label, count)| HistogramEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

fn mean(values: impl Iterator<Item = u128>) -> Option<u128> {
    let (sum, n) = values.fold((0u128, 0u128), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n)
}

impl Statistics {
    /// Count for one histogram label, 0 if it never occurred
    #[cfg(test)]
    pub fn count_of(&self, label: &str) -> usize {
        self.histogram
            .iter()
            .find(|entry| entry.label == label)
            .map_or(0, |entry| entry.count)
    }

    /// Share of 2xx outcomes, between 0 and 1
    pub fn success_ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.success_count as f64 / self.total as f64)
    }

    /// 2xx responses per second of wall time
    pub fn success_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.success_count as f64 / secs
        } else {
            0.0
        }
    }
}
