//! `pgsrv` – serve files until killed.

use anyhow::Result;
use parget_core::config::ServerSettings;
use parget_core::server::Server;

pub async fn run_serve(settings: &ServerSettings) -> Result<()> {
    let server = Server::bind(settings).await?;
    server.run().await;
    Ok(())
}
