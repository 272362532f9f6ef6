// src/probe/mod.rs
// =============================================================================
// This module contains the bounded-concurrency probing pipeline.
//
// Submodules:
// - outcome: The record every fetch produces, and how it is classified
// - fetch: Performs one GET request and classifies what happened
// - gate: Limits how many fetches run at the same time
// - dispatch: Starts one fetch task per URL through the gate
// - collect: Gathers outcomes from all tasks into one list
// - pipeline: Runs dispatch and collection together
// =============================================================================

mod collect;
mod dispatch;
mod fetch;
mod gate;
mod outcome;
mod pipeline;

pub use fetch::HttpFetcher;
pub use outcome::{Classification, FetchOutcome, TransportErrorKind};
pub use pipeline::probe_all;
