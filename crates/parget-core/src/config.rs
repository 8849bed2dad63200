use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1 << 20;

/// Default number of concurrent connections.
pub const DEFAULT_CONNECTIONS: usize = 5;

/// Default server listen address (all interfaces).
pub const DEFAULT_LISTEN_ADDR: &str = ":8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk size must be greater than 0")]
    ZeroChunkSize,
    #[error("connection count must be greater than 0")]
    ZeroConnections,
}

/// Client defaults (`[client]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Bytes requested per chunk.
    pub chunk_size: u64,
    /// Concurrent download workers, one connection each.
    pub connections: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            connections: DEFAULT_CONNECTIONS,
        }
    }
}

impl ClientSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.connections == 0 {
            return Err(ConfigError::ZeroConnections);
        }
        Ok(())
    }
}

/// Server defaults (`[server]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on; `:PORT` means all interfaces.
    pub listen_addr: String,
    /// Directory the served files are expected under. Informational only:
    /// request paths are opened exactly as the client sends them.
    pub base_path: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            base_path: PathBuf::from("."),
        }
    }
}

/// Global configuration loaded from `~/.config/parget/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PargetConfig {
    pub client: ClientSettings,
    pub server: ServerSettings,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("parget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PargetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PargetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<PargetConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: PargetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
