// src/probe/dispatch.rs
// =============================================================================
// The dispatcher walks the URL list and starts one fetch task per URL.
//
// How it works:
// 1. Take the next URL (stop at the limit, if one is configured)
// 2. Wait for a free slot from the admission gate
// 3. Spawn a task that owns the slot, fetches, and sends the outcome on
// 4. Repeat until the input runs out
// 5. Drop our sender (nothing more is coming) and wait for every task
//
// The slot moves into the task, so it is released when the task finishes no
// matter how the fetch went. URLs are dispatched in input order; they finish
// in whatever order the network decides.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use log::{debug, trace, warn};
use tokio::task::JoinSet;

use super::collect::OutcomeSender;
use super::fetch::Fetcher;
use super::gate::AdmissionGate;

/// Dispatches every URL of `urls` (at most `limit` of them) through `gate`
///
/// Returns how many URLs were dispatched, once every spawned task finished.
/// Each of them delivered exactly one outcome to `tx`.
pub async fn dispatch<S, F>(
    urls: S,
    limit: Option<usize>,
    gate: &AdmissionGate,
    fetcher: Arc<F>,
    tx: OutcomeSender,
) -> Result<usize>
where
    S: Stream<Item = String>,
    F: Fetcher,
{
    let urls = urls.take(limit.unwrap_or(usize::MAX));
    let mut urls = std::pin::pin!(urls);

    let mut tasks = JoinSet::new();
    let mut dispatched = 0;

    while let Some(url) = urls.next().await {
        let slot = gate
            .acquire()
            .await
            .context("Admission gate closed while dispatching")?;

        trace!(
            "dispatching #{dispatched} ({} slot(s) left): {url}",
            gate.available()
        );

        let fetcher = Arc::clone(&fetcher);
        let tx = tx.clone();
        tasks.spawn(async move {
            let outcome = fetcher.fetch(url).await;
            slot.release();
            // The collector only goes away after every sender is dropped
            if let Err(lost) = tx.send(outcome) {
                warn!("collector gone, dropping outcome for {}", lost.0.url);
            }
        });
        dispatched += 1;

        // Reap finished tasks as we go so the set doesn't grow with the input
        while let Some(joined) = tasks.try_join_next() {
            propagate_panic(joined);
        }
    }

    // No more work: the collector finishes once the tasks drop their clones
    drop(tx);
    debug!("dispatched {dispatched} URL(s), waiting for in-flight requests");

    while let Some(joined) = tasks.join_next().await {
        propagate_panic(joined);
    }

    Ok(dispatched)
}

// A panicking fetcher would silently lose an outcome, so surface it
fn propagate_panic(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            std::panic::resume_unwind(e.into_panic());
        }
    }
}
