//! Real parget server on a loopback port for integration tests.

use parget_core::config::ServerSettings;
use parget_core::server::Server;
use std::path::{Path, PathBuf};

/// Starts a server on `127.0.0.1:0` in a background task and returns its
/// address (e.g. "127.0.0.1:41234"). The server runs until the runtime stops.
pub async fn start() -> String {
    let settings = ServerSettings {
        listen_addr: "127.0.0.1:0".to_string(),
        ..ServerSettings::default()
    };
    let server = Server::bind(&settings).await.expect("bind");
    let addr = server.local_addr().expect("local addr").to_string();
    tokio::spawn(server.run());
    addr
}

/// Address on which nothing is listening.
pub fn dead_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();
    drop(listener);
    addr
}

/// Deterministic non-repeating-per-chunk body of `len` bytes.
pub fn body(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i / 3) ^ (i >> 11)) as u8).collect()
}

pub fn write_source(dir: &Path, name: &str, body: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write source");
    path
}
