// Helpers shared by the unit tests of several modules

use std::time::{Duration, SystemTime};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::probe::{Classification, FetchOutcome};

/// A URL on a local port nobody listens on: bind, read the port, close it
pub(crate) fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

/// A local server that answers exactly one connection with `reply`
/// (possibly nothing) and then closes it. Returns "127.0.0.1:port".
pub(crate) async fn one_shot_server(reply: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        // Read the request first so closing doesn't turn into a reset
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let _ = socket.write_all(reply).await;
        let _ = socket.shutdown().await;
    });

    addr.to_string()
}

/// Builds an outcome with the given classification and latency in ms
pub(crate) fn outcome(url: &str, classification: Classification, latency_ms: u64) -> FetchOutcome {
    FetchOutcome::new(
        url,
        classification,
        Duration::from_millis(latency_ms),
        SystemTime::UNIX_EPOCH,
    )
}
