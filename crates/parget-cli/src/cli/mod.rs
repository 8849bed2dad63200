//! CLI for the parget client and server.

mod commands;

use anyhow::Result;
use clap::Parser;
use parget_core::client::DownloadOptions;
use parget_core::config::{self, PargetConfig};
use std::ffi::OsString;
use std::path::PathBuf;

use commands::{run_fetch, run_serve};

/// Long flags the client also accepts with a single dash (`-chunk 4096`).
const CLIENT_SINGLE_DASH_FLAGS: &[&str] = &["chunk", "conns"];

/// Parallel download client.
#[derive(Debug, Parser)]
#[command(name = "pgcl")]
#[command(about = "Download one file from a parget server over parallel connections", long_about = None)]
pub struct ClientCli {
    /// Server address (host:port).
    pub server_addr: String,

    /// Path of the file on the server.
    pub remote_file: String,

    /// Where to write the downloaded file.
    pub local_file: PathBuf,

    /// Size of chunks being downloaded, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub chunk: Option<u64>,

    /// Number of concurrent connections.
    #[arg(long, value_name = "N")]
    pub conns: Option<usize>,
}

/// Range server for parget clients.
#[derive(Debug, Parser)]
#[command(name = "pgsrv")]
#[command(about = "Serve files to parget clients", long_about = None)]
pub struct ServerCli {
    /// Address to listen on (":PORT" means all interfaces).
    #[arg(short = 'a', long = "addr", value_name = "ADDR")]
    pub listen_addr: Option<String>,

    /// Path with files to be served.
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub base_path: Option<PathBuf>,
}

/// Rewrites `-name` / `-name=value` to `--name` / `--name=value` for the given
/// long flag names, leaving every other argument untouched.
pub fn normalize_single_dash_flags<I>(args: I, names: &[&str]) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(s) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = s.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split('=').next().unwrap_or(rest);
            if names.contains(&name) {
                OsString::from(format!("-{}", s))
            } else {
                arg
            }
        })
        .collect()
}

fn load_config() -> PargetConfig {
    match config::load_or_init() {
        Ok(cfg) => {
            tracing::debug!("loaded config: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::warn!("using built-in defaults, config not loaded: {:#}", e);
            PargetConfig::default()
        }
    }
}

impl ClientCli {
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_single_dash_flags(
            std::env::args_os(),
            CLIENT_SINGLE_DASH_FLAGS,
        ))
    }

    /// Builds the run options: config file values overridden by flags.
    pub fn download_options(&self, cfg: &PargetConfig) -> Result<DownloadOptions> {
        let mut settings = cfg.client.clone();
        if let Some(chunk) = self.chunk {
            settings.chunk_size = chunk;
        }
        if let Some(conns) = self.conns {
            settings.connections = conns;
        }
        settings.validate()?;
        Ok(DownloadOptions::new(
            self.server_addr.clone(),
            self.remote_file.clone(),
            self.local_file.clone(),
            &settings,
        ))
    }

    pub async fn run_from_args() -> Result<()> {
        let cli = Self::parse_args();
        let cfg = load_config();
        let opts = cli.download_options(&cfg)?;
        run_fetch(&opts).await
    }
}

impl ServerCli {
    pub fn server_settings(&self, cfg: &PargetConfig) -> config::ServerSettings {
        let mut settings = cfg.server.clone();
        if let Some(addr) = &self.listen_addr {
            settings.listen_addr = addr.clone();
        }
        if let Some(path) = &self.base_path {
            settings.base_path = path.clone();
        }
        settings
    }

    pub async fn run_from_args() -> Result<()> {
        let cli = Self::parse();
        let cfg = load_config();
        run_serve(&cli.server_settings(&cfg)).await
    }
}

#[cfg(test)]
mod tests;
