// src/input/source.rs
// =============================================================================
// Reads the list of URLs to probe.
//
// The list is a plain text file with one URL per line, or the same thing piped
// in on standard input. Lines are read lazily, so the dispatcher can start
// probing before the whole input has arrived (handy with `cat huge.txt |`).
//
// Rust concepts:
// - Trait objects: `Box<dyn AsyncRead>` lets a file and stdin share one code path
// - Streams: The async cousin of iterators
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use log::{info, warn};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::wrappers::LinesStream;

// Passing "-" as the path means "read from stdin", like most Unix tools
const STDIN_PATH: &str = "-";

/// Opens the URL list at `path`, or standard input when `path` is None or "-"
///
/// Fails only if the file cannot be opened. Read errors later on end the
/// stream with a warning.
pub async fn open_urls(path: Option<&Path>) -> Result<BoxStream<'static, String>> {
    let reader: Box<dyn AsyncRead + Send + Unpin> = match path {
        Some(path) if path != Path::new(STDIN_PATH) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open URL list '{}'", path.display()))?;
            info!("Reading URLs from {}", path.display());
            Box::new(file)
        }
        _ => {
            info!("Reading URLs from standard input");
            Box::new(tokio::io::stdin())
        }
    };

    Ok(url_lines(reader))
}

/// Splits a reader into trimmed, non-empty lines
pub fn url_lines<R>(reader: R) -> BoxStream<'static, String>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    LinesStream::new(BufReader::new(reader).lines())
        // Stop at the first read error instead of spinning on it
        .scan((), |_, line| {
            future::ready(match line {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!("Stopped reading URLs: {e}");
                    None
                }
            })
        })
        .filter_map(|line| {
            let line = line.trim();
            future::ready((!line.is_empty()).then(|| line.to_string()))
        })
        .boxed()
}
