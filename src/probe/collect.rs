// src/probe/collect.rs
// =============================================================================
// The collector is the single place where results from all fetch tasks meet.
//
// Every task gets a clone of an `OutcomeSender` and pushes exactly one
// outcome into it. The collector owns the only receiver. The channel closes
// once every sender is gone, which happens when the dispatcher has dropped its
// own sender (no more work) AND every spawned task has finished. That makes
// "the channel is drained" the same thing as "all work is done".
// =============================================================================

use tokio::sync::mpsc;

use super::outcome::FetchOutcome;

/// Handle fetch tasks use to deliver their outcome
pub type OutcomeSender = mpsc::UnboundedSender<FetchOutcome>;

/// Receiving end of the outcome channel
#[derive(Debug)]
pub struct Collector {
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

/// Creates a connected sender/collector pair
///
/// Unbounded: a finished task never waits on the consumer.
pub fn channel() -> (OutcomeSender, Collector) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Collector { rx })
}

impl Collector {
    /// Receives outcomes until every sender is dropped
    ///
    /// `on_arrival` sees each outcome the moment it arrives, which is what
    /// the streaming output is built on. The returned vector is in arrival
    /// order.
    pub async fn collect<F>(mut self, mut on_arrival: F) -> Vec<FetchOutcome>
    where
        F: FnMut(&FetchOutcome),
    {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.rx.recv().await {
            on_arrival(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }
}
