//! Range server.
//!
//! Accepts TCP connections and runs one independent [`handle_connection`]
//! task per client. Request paths are opened exactly as the client sends them;
//! the configured base path is not a sandbox.

mod cache;
mod handler;

pub use cache::FileCache;
pub use handler::handle_connection;

use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerSettings;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// `:PORT` means all interfaces; anything else is used unchanged.
pub fn resolve_listen_addr(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    }
}

/// A bound listener ready to serve.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    pub async fn bind(settings: &ServerSettings) -> Result<Self, ServeError> {
        let addr = resolve_listen_addr(&settings.listen_addr);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        tracing::info!(
            addr = %settings.listen_addr,
            base_path = %settings.base_path.display(),
            "server listening"
        );
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; runs until the process exits. Accept errors are logged
    /// and the loop keeps going.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted connection");
                    tokio::spawn(handle_connection(stream, peer));
                }
                Err(e) => tracing::warn!("accept failed: {}", e),
            }
        }
    }
}
