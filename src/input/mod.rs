// src/input/mod.rs
// =============================================================================
// This module turns a file (or stdin) into a stream of URLs.
// =============================================================================

mod source;

pub use source::open_urls;
