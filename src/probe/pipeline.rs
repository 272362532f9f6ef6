// src/probe/pipeline.rs
// =============================================================================
// Wires the pieces together:
//
//   URLs -> dispatcher -> (gate) -> fetch tasks -> collector -> Vec<FetchOutcome>
//
// The dispatcher and the collector run side by side on the current task
// (tokio::join!), the fetches run as spawned tasks. We return only once the
// collector has drained the channel, i.e. after every fetch reported back.
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use futures::Stream;
use log::{debug, warn};

use super::collect;
use super::dispatch::dispatch;
use super::fetch::Fetcher;
use super::gate::AdmissionGate;
use super::outcome::FetchOutcome;
use crate::config::ProbeConfig;

/// Probes every URL of `urls` and returns all outcomes in arrival order
///
/// `on_outcome` is called once per outcome as soon as it arrives.
pub async fn probe_all<S, F, C>(
    urls: S,
    config: &ProbeConfig,
    fetcher: Arc<F>,
    on_outcome: C,
) -> Result<Vec<FetchOutcome>>
where
    S: Stream<Item = String>,
    F: Fetcher,
    C: FnMut(&FetchOutcome),
{
    let gate = AdmissionGate::new(config.concurrency);
    debug!("admission gate open with {} slot(s)", gate.capacity());
    let (tx, collector) = collect::channel();

    let (dispatched, outcomes) = tokio::join!(
        dispatch(urls, config.limit, &gate, fetcher, tx),
        collector.collect(on_outcome)
    );
    let dispatched = dispatched?;

    if outcomes.len() != dispatched {
        warn!(
            "dispatched {dispatched} URL(s) but collected {} outcome(s)",
            outcomes.len()
        );
    }

    Ok(outcomes)
}
